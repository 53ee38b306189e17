mod assembler;
mod engine;
mod enroll;
mod report;

pub use assembler::{assemble, OFFCHAIN_LINK_PLACEHOLDER};
pub use engine::SyncEngine;
pub use enroll::EnrollEngine;
pub use report::{RecordResult, RecordStatus, RunReport};

#[cfg(test)]
mod tests;
