use uuid::Uuid;

use crate::CodeGenerator;
use shared::witness::WITNESS_CODE_LENGTH;

/// Four random hex digits taken from a v4 uuid.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(WITNESS_CODE_LENGTH)
            .collect()
    }
}
