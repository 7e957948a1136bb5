mod common;
mod special;
