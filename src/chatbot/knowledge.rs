//! Static agricultural knowledge used by the conversation engine.

use once_cell::sync::Lazy;

/// Per-crop guide texts
#[derive(Debug, Clone)]
pub struct CropGuide {
    pub name: &'static str,
    pub description: &'static str,
    pub cultivation: &'static str,
    pub diseases: &'static str,
    pub harvest: &'static str,
}

#[derive(Debug, Clone)]
pub struct SoilGuide {
    pub ph_correction: &'static str,
    pub fertilization: &'static str,
    pub conservation: &'static str,
}

#[derive(Debug, Clone)]
pub struct IrrigationGuide {
    pub types: &'static str,
    pub scheduling: &'static str,
    pub water_saving: &'static str,
}

#[derive(Debug, Clone)]
pub struct PestGuide {
    pub integrated: &'static str,
}

#[derive(Debug, Clone)]
pub struct ClimateGuide {
    pub drought: &'static str,
    pub excess_rain: &'static str,
    pub heat: &'static str,
}

#[derive(Debug, Clone)]
pub struct MarketGuide {
    pub prices: &'static str,
    pub value_addition: &'static str,
    pub access: &'static str,
}

#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    pub crops: Vec<CropGuide>,
    pub soil: SoilGuide,
    pub irrigation: IrrigationGuide,
    pub pests: PestGuide,
    pub climate: ClimateGuide,
    pub market: MarketGuide,
}

impl KnowledgeBase {
    /// First guide, in knowledge-base order, whose name occurs in `message`
    /// (case-insensitive). Where the names sit in the message does not matter.
    pub fn mentioned_crop(&self, message: &str) -> Option<&CropGuide> {
        let lower = message.to_lowercase();
        self.crops
            .iter()
            .find(|guide| lower.contains(&guide.name.to_lowercase()))
    }

    pub fn crop(&self, name: &str) -> Option<&CropGuide> {
        let wanted = name.to_lowercase();
        self.crops.iter().find(|g| g.name.to_lowercase() == wanted)
    }
}

pub static KNOWLEDGE_BASE: Lazy<KnowledgeBase> = Lazy::new(|| KnowledgeBase {
    crops: vec![
        CropGuide {
            name: "Maïs",
            description: "Le maïs est une céréale cultivée pour ses grains riches en amidon. Il nécessite un climat chaud et humide avec une température optimale de 20-30°C. Le cycle cultural dure 90-120 jours selon les variétés.",
            cultivation: "Semis direct à 75cm entre lignes et 25cm sur ligne. Fertilisation NPK 15-15-15 à 200-300 kg/ha. Besoin en eau: 500-800mm sur le cycle.",
            diseases: "Principales maladies: Chenille légionnaire, Helminthosporiose, Striure. Traitement préventif recommandé.",
            harvest: "Récolte quand les grains atteignent 25-30% d'humidité. Rendement moyen: 2-6 tonnes/ha.",
        },
        CropGuide {
            name: "Riz",
            description: "Le riz est la céréale la plus consommée au monde. Culture en zone humide nécessitant beaucoup d'eau. Température optimale: 20-35°C. Cycle: 120-150 jours.",
            cultivation: "Repiquage à 20cm x 20cm. Maintenir 5-10cm d'eau permanente. NPK 20-10-10 + urée en couverture. Désherbage crucial.",
            diseases: "Pyriculariose, pourriture des racines, adventices aquatiques. Gestion de l'eau essentielle pour prévention.",
            harvest: "Récolte à maturité complète (grains dorés). Rendement: 3-7 tonnes/ha selon irrigation.",
        },
        CropGuide {
            name: "Tomate",
            description: "La tomate est un fruit-légume cultivé en saison fraîche. Température optimale: 18-27°C. Cycle court: 90-120 jours. Culture exigeante en eau et nutriments.",
            cultivation: "Plantation sur billons à 60cm x 40cm. Tuteurage nécessaire. NPK 10-20-20 + calcium. Irrigation goutte-à-goutte recommandée.",
            diseases: "Mildiou, alternariose, nématodes. Traitement fongicide préventif obligatoire. Rotation des cultures importante.",
            harvest: "Récolte échelonnée selon maturité. Rendement: 20-60 tonnes/ha selon système.",
        },
        CropGuide {
            name: "Manioc",
            description: "Le manioc est un tubercule de base en Afrique. Très résistant à la sécheresse. Cycle long: 8-24 mois. Pousse sur sols pauvres.",
            cultivation: "Plantation de boutures à 1m x 1m. Peu d'engrais nécessaire. Buttage à 3-4 mois. Très peu d'entretien.",
            diseases: "Mosaïque du manioc, bactériose, cochenilles. Utiliser boutures saines.",
            harvest: "Récolte à 10-12 mois minimum. Rendement: 10-30 tonnes/ha de tubercules frais.",
        },
        CropGuide {
            name: "Oignon",
            description: "L'oignon est un bulbe cultivé pour son goût. Préfère climat frais. Température: 13-24°C. Cycle: 90-120 jours.",
            cultivation: "Semis en pépinière puis repiquage à 10cm x 20cm. NPK équilibré. Irrigation régulière mais modérée.",
            diseases: "Mildiou, pourriture blanche, thrips. Drainage important.",
            harvest: "Récolte quand feuilles tombent. Séchage 2 semaines. Rendement: 15-40 tonnes/ha.",
        },
    ],
    soil: SoilGuide {
        ph_correction: "Pour sol acide (pH < 5.5): appliquer chaux à 1-3 tonnes/ha. Pour sol alcalin (pH > 7.5): apporter soufre ou gypse.",
        fertilization: "Analyse de sol recommandée avant fertilisation. NPK selon culture. Matière organique 20 tonnes/ha tous les 2 ans.",
        conservation: "Pratiques de conservation: paillage, culture de couverture, rotation, agroforesterie. Limite érosion et améliore fertilité.",
    },
    irrigation: IrrigationGuide {
        types: "Goutte-à-goutte (90% efficacité), aspersion (75%), gravitaire (50%). Choisir selon culture et disponibilité eau.",
        scheduling: "Irrigation selon stade: critique à floraison et formation fruits. Eviter sur-irrigation (maladies).",
        water_saving: "Paillage, irrigation localisée, choix variétés résistantes, calendrier cultural optimisé.",
    },
    pests: PestGuide {
        integrated: "Lutte intégrée: rotation, plantes pièges, auxiliaires naturels, traitements ciblés si nécessaire.",
    },
    climate: ClimateGuide {
        drought: "Variétés tolérantes sécheresse, paillage, irrigation localisée, semis précoces, cultures intercalaires.",
        excess_rain: "Drainage, billonnage, variétés tolérantes, protection fongicide, retard semis si nécessaire.",
        heat: "Ombrage léger, irrigation fréquente, variétés adaptées, horaires travaux adaptés.",
    },
    market: MarketGuide {
        prices: "Prix varient selon saison, qualité, marché. Stockage post-récolte pour meilleurs prix. Organisations de producteurs recommandées.",
        value_addition: "Transformation (séchage, farine, conserves) augmente valeur. Certification bio/commerce équitable = prix premium.",
        access: "Coopératives agricoles facilitent accès marché, intrants, crédit, formation. Association recommandée.",
    },
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_crop_guides() {
        let names: Vec<&str> = KNOWLEDGE_BASE.crops.iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["Maïs", "Riz", "Tomate", "Manioc", "Oignon"]);
    }

    #[test]
    fn test_mentioned_crop_is_case_insensitive() {
        let guide = KNOWLEDGE_BASE.mentioned_crop("Comment cultiver le MAÏS ?").unwrap();
        assert_eq!(guide.name, "Maïs");
        assert!(KNOWLEDGE_BASE.mentioned_crop("Comment cultiver le blé ?").is_none());
    }

    #[test]
    fn test_mentioned_crop_follows_guide_order() {
        // Riz is listed before Tomate
        let guide = KNOWLEDGE_BASE
            .mentioned_crop("tomate ou riz, que planter ?")
            .unwrap();
        assert_eq!(guide.name, "Riz");

        let guide = KNOWLEDGE_BASE
            .mentioned_crop("Comment cultiver le riz après le maïs ?")
            .unwrap();
        assert_eq!(guide.name, "Maïs");
    }

    #[test]
    fn test_crop_lookup() {
        assert_eq!(KNOWLEDGE_BASE.crop("manioc").unwrap().name, "Manioc");
        assert_eq!(KNOWLEDGE_BASE.crop("maïs").unwrap().name, "Maïs");
        assert!(KNOWLEDGE_BASE.crop("Coton").is_none());
    }
}
