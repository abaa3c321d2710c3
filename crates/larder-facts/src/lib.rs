//! Rule-based product facts: dietary and allergen inference from
//! ingredient text, and nutrition parsing from HTML, text, CSV columns and
//! Open Food Facts payloads into one per-100g record.

pub mod dietary;
pub mod nutrition;
pub mod text;

pub use dietary::allergens::{extract_allergens, parse_allergen_statement, AllergenStatement};
pub use dietary::certifications::detect_certifications;
pub use dietary::ingredients::parse_ingredients_list;
pub use dietary::{badges_from_text, detect_dietary, DietaryRule, DIETARY_RULES};
pub use nutrition::{
    clean_value, extract_serving_size, metafield_lines, nutrition_claims, parse_nutrition,
    per_serving, NutritionInput,
};
