use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{debug, error};

use crate::chatbot::intent::{classify, Intent};
use crate::chatbot::knowledge::{CropGuide, KnowledgeBase, KNOWLEDGE_BASE};
use crate::chatbot::session::{Exchange, SessionStore};
use crate::error::Result;
use crate::metrics::CHAT_MESSAGES_TOTAL;

/// Confidence reported for every templated answer
pub const RESPONSE_CONFIDENCE: f64 = 0.85;

const GENERAL_SOURCE: &str = "Base de connaissances";

/// Response language. Anything that is not English is answered in French.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    Fr,
    En,
}

impl Language {
    pub fn from_code(code: &str) -> Self {
        let code = code.trim().to_lowercase();
        if code == "en" || code.starts_with("en-") || code.starts_with("en_") {
            Language::En
        } else {
            Language::Fr
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub intent: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Templated answer text plus the knowledge-base sections it drew on
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub sources: Vec<String>,
}

impl Reply {
    fn new(text: String, source: impl Into<String>) -> Self {
        Self {
            text,
            sources: vec![source.into()],
        }
    }
}

/// Keyword-driven agricultural assistant
pub struct ConversationEngine {
    knowledge: &'static KnowledgeBase,
    sessions: Arc<dyn SessionStore>,
    default_language: Language,
}

impl ConversationEngine {
    pub fn new(sessions: Arc<dyn SessionStore>, default_language: &str) -> Self {
        Self {
            knowledge: &KNOWLEDGE_BASE,
            sessions,
            default_language: Language::from_code(default_language),
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Answer `message`, recording the exchange when a user id is given.
    /// Never fails: errors produce the fallback sentence with intent "unknown".
    pub fn respond(&self, message: &str, user_id: Option<&str>, language: Option<&str>) -> ChatResponse {
        let language = language
            .map(Language::from_code)
            .unwrap_or(self.default_language);

        match self.try_respond(message, user_id, language) {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, user_id = ?user_id, "Chat response failed");
                CHAT_MESSAGES_TOTAL.with_label_values(&["unknown"]).inc();
                ChatResponse {
                    response: fallback_response(language).to_string(),
                    intent: "unknown".to_string(),
                    confidence: 0.0,
                    timestamp: Utc::now(),
                    sources: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn try_respond(&self, message: &str, user_id: Option<&str>, language: Language) -> Result<ChatResponse> {
        let intent = classify(message);
        let reply = self.compose(message, intent, language);

        if let Some(user_id) = user_id {
            self.sessions
                .append(user_id, Exchange::new(message, reply.text.clone()))?;
        }

        CHAT_MESSAGES_TOTAL
            .with_label_values(&[&intent.to_string()])
            .inc();
        debug!(%intent, %language, sources = ?reply.sources, "Chat message answered");

        Ok(ChatResponse {
            response: reply.text,
            intent: intent.to_string(),
            confidence: RESPONSE_CONFIDENCE,
            timestamp: Utc::now(),
            sources: reply.sources,
            error: None,
        })
    }

    pub fn history(&self, user_id: &str) -> Result<Vec<Exchange>> {
        self.sessions.history(user_id)
    }

    /// Pure function of (message, intent, language)
    pub fn compose(&self, message: &str, intent: Intent, language: Language) -> Reply {
        let kb = self.knowledge;
        let crop = kb.mentioned_crop(message);

        let reply = match (intent, crop) {
            (Intent::Cultivation, Some(guide)) => Some(cultivation(guide, language)),
            (Intent::Disease, Some(guide)) => Some(disease(kb, guide, language)),
            (Intent::Yield, Some(guide)) => Some(harvest(guide, language)),
            (Intent::Fertilization, _) => Some(fertilization(kb, language)),
            (Intent::Irrigation, _) => Some(irrigation(kb, language)),
            (Intent::Market, _) => Some(market(kb, language)),
            (Intent::Soil, _) => Some(soil(kb, language)),
            (Intent::Climate, _) => Some(climate(kb, language)),
            (Intent::Recommendation, _) => Some(Reply::new(
                recommendation_text(language).to_string(),
                GENERAL_SOURCE,
            )),
            _ => None,
        };

        reply.unwrap_or_else(|| Reply::new(general_response(language).to_string(), GENERAL_SOURCE))
    }
}

fn sections(title: String, parts: &[(&str, &str)]) -> String {
    let mut text = title;
    for (heading, body) in parts {
        text.push_str("\n\n");
        if !heading.is_empty() {
            text.push_str(&format!("**{}:**\n", heading));
        }
        text.push_str(body);
    }
    text
}

fn cultivation(guide: &CropGuide, language: Language) -> Reply {
    let (title, practices, harvest) = match language {
        Language::Fr => (format!("**Culture du {}**", guide.name), "Pratiques culturales", "Récolte"),
        Language::En => (format!("**Growing {}**", guide.name), "Cultivation practices", "Harvest"),
    };
    let text = sections(
        title,
        &[
            ("", guide.description),
            (practices, guide.cultivation),
            (harvest, guide.harvest),
        ],
    );
    Reply::new(text, format!("Guide de culture - {}", guide.name))
}

fn disease(kb: &KnowledgeBase, guide: &CropGuide, language: Language) -> Reply {
    let (title, integrated) = match language {
        Language::Fr => (format!("**Maladies et ravageurs du {}**", guide.name), "Lutte intégrée"),
        Language::En => (format!("**{} Diseases and Pests**", guide.name), "Integrated Management"),
    };
    let text = sections(
        title,
        &[("", guide.diseases), (integrated, kb.pests.integrated)],
    );
    Reply::new(text, format!("Maladies - {}", guide.name))
}

fn harvest(guide: &CropGuide, language: Language) -> Reply {
    let (title, harvest, practices) = match language {
        Language::Fr => (format!("**Rendement du {}**", guide.name), "Récolte", "Pratiques culturales"),
        Language::En => (format!("**{} Yield**", guide.name), "Harvest", "Cultivation practices"),
    };
    let text = sections(
        title,
        &[(harvest, guide.harvest), (practices, guide.cultivation)],
    );
    Reply::new(text, format!("Guide de culture - {}", guide.name))
}

fn soil(kb: &KnowledgeBase, language: Language) -> Reply {
    let (title, ph, fertilization, conservation) = match language {
        Language::Fr => ("**Gestion du Sol**", "Correction du pH", "Fertilisation", "Conservation"),
        Language::En => ("**Soil Management**", "pH Correction", "Fertilization", "Conservation"),
    };
    let text = sections(
        title.to_string(),
        &[
            (ph, kb.soil.ph_correction),
            (fertilization, kb.soil.fertilization),
            (conservation, kb.soil.conservation),
        ],
    );
    Reply::new(text, "Guide de gestion du sol")
}

fn fertilization(kb: &KnowledgeBase, language: Language) -> Reply {
    let (title, guidelines, ph) = match language {
        Language::Fr => ("**Fertilisation**", "Recommandations", "Correction du pH"),
        Language::En => ("**Fertilization**", "Guidelines", "pH Correction"),
    };
    let text = sections(
        title.to_string(),
        &[(guidelines, kb.soil.fertilization), (ph, kb.soil.ph_correction)],
    );
    Reply::new(text, "Guide de gestion du sol")
}

fn irrigation(kb: &KnowledgeBase, language: Language) -> Reply {
    let (title, types, scheduling, saving) = match language {
        Language::Fr => ("**Irrigation Agricole**", "Types d'irrigation", "Calendrier", "Économie d'eau"),
        Language::En => ("**Agricultural Irrigation**", "Irrigation types", "Scheduling", "Water saving"),
    };
    let text = sections(
        title.to_string(),
        &[
            (types, kb.irrigation.types),
            (scheduling, kb.irrigation.scheduling),
            (saving, kb.irrigation.water_saving),
        ],
    );
    Reply::new(text, "Guide d'irrigation")
}

fn market(kb: &KnowledgeBase, language: Language) -> Reply {
    let (title, prices, value, access) = match language {
        Language::Fr => ("**Marché Agricole**", "Prix", "Valeur ajoutée", "Accès au marché"),
        Language::En => ("**Agricultural Market**", "Prices", "Value addition", "Market access"),
    };
    let text = sections(
        title.to_string(),
        &[
            (prices, kb.market.prices),
            (value, kb.market.value_addition),
            (access, kb.market.access),
        ],
    );
    Reply::new(text, "Informations de marché")
}

fn climate(kb: &KnowledgeBase, language: Language) -> Reply {
    let (title, drought, rain, heat) = match language {
        Language::Fr => ("**Adaptation Climatique**", "Sécheresse", "Excès de pluie", "Fortes chaleurs"),
        Language::En => ("**Climate Adaptation**", "Drought", "Excess rain", "Heat"),
    };
    let text = sections(
        title.to_string(),
        &[
            (drought, kb.climate.drought),
            (rain, kb.climate.excess_rain),
            (heat, kb.climate.heat),
        ],
    );
    Reply::new(text, "Guide d'adaptation climatique")
}

fn recommendation_text(language: Language) -> &'static str {
    match language {
        Language::Fr => "**Recommandations de cultures**\n\n\
            Pour une recommandation personnalisée, utilisez notre outil de recommandation dans l'application. \
            Vous pourrez entrer vos données de sol, climat et localisation pour obtenir les meilleures cultures adaptées.\n\n\
            **Cultures populaires au Cameroun:**\n\
            - Maïs: Adapté à presque toutes les régions\n\
            - Manioc: Résistant, faible entretien\n\
            - Riz: Zones humides, bon rendement\n\
            - Tomate: Rentable, demande élevée\n\
            - Arachide: Sol léger, rotation bénéfique",
        Language::En => "**Crop Recommendations**\n\n\
            For personalized recommendations, use our recommendation tool in the application. \
            You can enter your soil, climate and location data to get the best adapted crops.\n\n\
            **Popular crops in Cameroon:**\n\
            - Maize: Adapted to almost all regions\n\
            - Cassava: Resistant, low maintenance\n\
            - Rice: Humid zones, good yield\n\
            - Tomato: Profitable, high demand\n\
            - Peanut: Light soil, beneficial rotation",
    }
}

pub fn general_response(language: Language) -> &'static str {
    match language {
        Language::Fr => "Je suis votre assistant agricole intelligent. Je peux vous aider avec:\n\n\
            🌱 Recommandations de cultures\n\
            💧 Irrigation et gestion de l'eau\n\
            🌿 Fertilisation et gestion du sol\n\
            🐛 Maladies et ravageurs\n\
            📊 Prévisions de rendement\n\
            💰 Prix de marché\n\n\
            Posez-moi vos questions agricoles!",
        Language::En => "I'm your intelligent agricultural assistant. I can help you with:\n\n\
            🌱 Crop recommendations\n\
            💧 Irrigation and water management\n\
            🌿 Fertilization and soil management\n\
            🐛 Diseases and pests\n\
            📊 Yield forecasts\n\
            💰 Market prices\n\n\
            Ask me your agricultural questions!",
    }
}

pub fn fallback_response(language: Language) -> &'static str {
    match language {
        Language::Fr => "Désolé, je n'ai pas pu traiter votre demande. \
            Pourriez-vous reformuler votre question différemment?",
        Language::En => "Sorry, I couldn't process your request. \
            Could you rephrase your question differently?",
    }
}
