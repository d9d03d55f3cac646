pub mod cursor;
pub mod filter;
pub mod keyset;
