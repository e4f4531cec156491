/// Agricultural assistant
///
/// Ordered keyword rules pick an intent, the static knowledge base supplies
/// the text, and bilingual templates shape the answer. History lives in an
/// injected `SessionStore`.

pub mod engine;
pub mod intent;
pub mod knowledge;
pub mod session;

pub use engine::{ChatResponse, ConversationEngine, Language, Reply};
pub use intent::{classify, Intent, INTENT_RULES};
pub use knowledge::{KnowledgeBase, KNOWLEDGE_BASE};
pub use session::{Exchange, InMemorySessionStore, SessionStore};
