//! System instruction built from the knowledge document.

use crate::entities::KnowledgeDocument;

const INSTRUCTION_HEADER: &str = "\
You are the customer assistant for Vercup (버컵), a startup that makes cup holders \
from spent mushroom substrate.

Rules:
1) Always answer in Korean.
2) Base your answers on the company data below whenever it covers the question.
3) If the data does not contain the answer, say clearly that the information is not \
in Vercup's materials before offering any general knowledge.
4) Keep answers concise and friendly.

Company data (JSON):
";

/// Instruction text sent as the system message of every completion request.
///
/// A pure function of the document: the same document always yields the same bytes.
pub fn system_instruction(knowledge: &KnowledgeDocument) -> String {
    let mut instruction = String::from(INSTRUCTION_HEADER);
    instruction.push_str(&knowledge.to_prompt_json());
    instruction
}
