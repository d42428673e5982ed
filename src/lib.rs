pub mod heap;
pub mod storage;
