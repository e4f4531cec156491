use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Coarse topic of a chat message
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Intent {
    Cultivation,
    Disease,
    Fertilization,
    Irrigation,
    Market,
    Soil,
    Climate,
    Yield,
    Recommendation,
    General,
}

/// Ordered keyword table. The first rule with a keyword contained in the
/// lowercased message wins; no match means `Intent::General`.
pub const INTENT_RULES: &[(Intent, &[&str])] = &[
    (Intent::Cultivation, &["culture", "cultiver", "planter", "semis"]),
    (Intent::Disease, &["maladie", "ravageur", "traiter", "pest"]),
    (Intent::Fertilization, &["engrais", "fertiliser", "npk", "fumure"]),
    (Intent::Irrigation, &["irrigation", "arroser", "eau"]),
    (Intent::Market, &["prix", "marché", "vendre", "acheter"]),
    (Intent::Soil, &["sol", "terre", "ph"]),
    (Intent::Climate, &["climat", "température", "pluie", "sécheresse"]),
    (Intent::Yield, &["rendement", "production", "récolte"]),
    (Intent::Recommendation, &["recommande", "conseille", "quelle culture"]),
];

pub fn classify(message: &str) -> Intent {
    let lower = message.to_lowercase();
    INTENT_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::General)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_each_rule_matches_its_keywords() {
        assert_eq!(classify("Comment cultiver le maïs ?"), Intent::Cultivation);
        assert_eq!(classify("Quelle MALADIE touche la tomate"), Intent::Disease);
        assert_eq!(classify("Quel engrais utiliser"), Intent::Fertilization);
        assert_eq!(classify("Quand arroser ?"), Intent::Irrigation);
        assert_eq!(classify("Le prix de l'oignon"), Intent::Market);
        assert_eq!(classify("Mon sol est acide"), Intent::Soil);
        assert_eq!(classify("La sécheresse arrive"), Intent::Climate);
        assert_eq!(classify("Améliorer mon rendement"), Intent::Yield);
        assert_eq!(classify("Que me conseillez-vous"), Intent::Recommendation);
    }

    #[test]
    fn test_precedence_follows_rule_order() {
        // cultivation beats disease
        assert_eq!(classify("culture et maladie du riz"), Intent::Cultivation);
        // "quelle culture" contains "culture", so cultivation wins over recommendation
        assert_eq!(classify("quelle culture choisir"), Intent::Cultivation);
        // irrigation beats soil
        assert_eq!(classify("eau et sol"), Intent::Irrigation);
    }

    #[test]
    fn test_empty_and_keyword_free_messages_are_general() {
        assert_eq!(classify(""), Intent::General);
        assert_eq!(classify("Bonjour !"), Intent::General);
        assert_eq!(classify("maïs"), Intent::General);
    }

    #[test]
    fn test_every_intent_but_general_has_a_rule() {
        let covered: Vec<Intent> = INTENT_RULES.iter().map(|(i, _)| *i).collect();
        for intent in Intent::iter().filter(|i| *i != Intent::General) {
            assert!(covered.contains(&intent), "{} has no rule", intent);
        }
    }

    #[test]
    fn test_wire_name() {
        assert_eq!(Intent::Recommendation.to_string(), "recommendation");
        assert_eq!(serde_json::to_value(Intent::Yield).unwrap(), "yield");
    }
}
