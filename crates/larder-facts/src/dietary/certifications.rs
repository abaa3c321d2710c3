use crate::text::contains_term;

const CERTIFICATIONS: [(&str, &[&str]); 11] = [
    ("Organic", &["organic", "certified organic"]),
    ("Fairtrade", &["fairtrade", "fair trade"]),
    ("Soil Association", &["soil association"]),
    ("Non-GMO", &["non-gmo", "non gmo", "gmo free", "gmo-free"]),
    ("Rainforest Alliance", &["rainforest alliance"]),
    ("B Corp", &["b corp", "b-corp", "bcorp"]),
    ("Leaping Bunny", &["leaping bunny"]),
    ("Vegan Society", &["vegan society"]),
    ("Vegetarian Society", &["vegetarian society"]),
    ("Kosher", &["kosher"]),
    ("Halal", &["halal"]),
];

/// Certification names mentioned in `text`, in table order.
#[must_use]
pub fn detect_certifications(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    CERTIFICATIONS
        .iter()
        .filter(|(_, phrases)| phrases.iter().any(|p| contains_term(&lower, p)))
        .map(|(name, _)| (*name).to_string())
        .collect()
}
