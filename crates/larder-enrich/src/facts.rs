//! Final enrichment stage: derive list, dietary, allergen and display facts
//! from whatever the earlier stages gathered.

use std::collections::BTreeSet;

use larder_core::{DataSource, Field, Product};
use larder_facts::{
    detect_dietary, extract_allergens, metafield_lines, parse_allergen_statement,
    parse_ingredients_list,
};

/// Allergens named in free text: keyword matches plus any `Contains:` clause.
///
/// Keywords after a `May contain` label are not counted.
#[must_use]
pub fn allergens_from_text(text: &str) -> BTreeSet<String> {
    let definite = text
        .to_ascii_lowercase()
        .find("may contain")
        .map_or(text, |at| &text[..at]);
    let mut allergens = extract_allergens(definite);
    allergens.extend(parse_allergen_statement(text).contains);
    allergens
}

/// Run dietary inference, allergen extraction and nutrition formatting.
///
/// Allergens found in the ingredients are added to any already present.
/// `May contain` entries stay on their own list. Tags the input marked as
/// not applying are removed from the inferred set.
pub fn apply_facts(product: &mut Product) {
    product.ingredients_list = parse_ingredients_list(&product.ingredients);

    let inferred = allergens_from_text(&product.ingredients);
    if product.allergens.is_empty() {
        let source = product
            .source_of(Field::Ingredients)
            .cloned()
            .unwrap_or(DataSource::Csv);
        product.fill_allergens(inferred, source);
    } else {
        product.allergens.extend(inferred);
    }

    for entry in parse_allergen_statement(&product.ingredients).may_contain {
        if !product.may_contain.contains(&entry) {
            product.may_contain.push(entry);
        }
    }

    let mut dietary = detect_dietary(
        &product.ingredients,
        &product.marker_text(),
        &product.dietary_badges,
        &product.nutrition,
    );
    dietary.retain(|tag| !product.dietary_denied.contains(tag));
    product.dietary = dietary;
    product.refresh_icons();

    product.nutrition_lines = metafield_lines(&product.nutrition);
}

#[cfg(test)]
mod tests {
    use larder_core::{DietaryTag, Nutrition};

    use super::*;

    fn product(ingredients: &str) -> Product {
        let mut p = Product::draft("Dark Chocolate Buttons", "Groceries").unwrap();
        p.fill_ingredients(ingredients, DataSource::OpenFoodFacts);
        p
    }

    #[test]
    fn allergens_and_may_contain_stay_separate() {
        let mut p = product("Cocoa mass, sugar, soya lecithin. May contain: milk, hazelnuts.");
        apply_facts(&mut p);
        assert!(p.allergens.contains("Soya"));
        assert!(!p.allergens.contains("Milk"));
        assert_eq!(p.may_contain, ["Milk", "Hazelnuts"]);
        assert_eq!(p.source_of(Field::Allergens), Some(&DataSource::OpenFoodFacts));
    }

    #[test]
    fn negated_contains_sentence_adds_no_allergen() {
        let found = allergens_from_text("Oats, dates. This bar contains no added sugar.");
        let names: Vec<&str> = found.iter().map(String::as_str).collect();
        assert_eq!(names, ["Cereals Containing Gluten"]);
    }

    #[test]
    fn denied_tags_are_removed_after_inference() {
        let mut p = product("Water, sugar, cocoa, salt");
        p.dietary_denied.insert(DietaryTag::Vegan);
        apply_facts(&mut p);
        assert!(!p.dietary.contains(&DietaryTag::Vegan));
        assert!(!p.icons.contains(&DietaryTag::Vegan));
    }

    #[test]
    fn explicit_badge_drives_icons_and_lines_follow_nutrition() {
        let mut p = product("Quinoa");
        p.fill_dietary_badges([DietaryTag::Organic], DataSource::Csv);
        let mut n = Nutrition::new();
        n.insert("energy_kj", "1540");
        n.insert("energy_kcal", "368");
        n.insert("fat", "6.1");
        p.fill_nutrition(n, DataSource::Csv);
        apply_facts(&mut p);
        assert!(p.dietary.contains(&DietaryTag::Organic));
        assert!(p.icons.contains(&DietaryTag::Organic));
        assert_eq!(p.nutrition_lines[0], "Energy: 1540kJ / 368kcal");
    }
}
