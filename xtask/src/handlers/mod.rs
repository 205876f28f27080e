pub mod bench;
pub mod codegen;
pub mod run;
pub mod testing;
