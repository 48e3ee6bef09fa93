/// Pure game rules: no terminal, audio or clock access.

pub mod action;
pub mod board;
pub mod piece;
pub mod shape;
