pub mod bus;
pub mod cpu;
pub mod disassembler;
pub mod instruction;
pub mod instruction_set;
pub mod internal_cpu;
pub mod memory;
pub mod status_register;

#[cfg(test)]
mod tests;
