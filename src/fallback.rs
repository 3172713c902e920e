//! Degraded-mode formatting. Successful provider output passes through
//! untouched; failures become a headed explanation followed by example
//! content, so the caller always has markdown to show.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{AnalysisOutcome, ErrorKind};

pub const INGREDIENT_CATALOG: [&str; 26] = [
    "Flour",
    "Sugar",
    "Eggs",
    "Butter",
    "Milk",
    "Chocolate",
    "Vanilla extract",
    "Baking powder",
    "Salt",
    "Olive oil",
    "Garlic",
    "Onions",
    "Tomatoes",
    "Chicken",
    "Beef",
    "Rice",
    "Pasta",
    "Potatoes",
    "Carrots",
    "Bell peppers",
    "Cheese",
    "Lettuce",
    "Spinach",
    "Apples",
    "Bananas",
    "Strawberries",
];

const MIN_INGREDIENTS: usize = 4;
const MAX_INGREDIENTS: usize = 8;

const STARCH_STAPLES: [&str; 2] = ["Pasta", "Rice"];
const SALAD_VEGETABLES: [&str; 3] = ["Lettuce", "Spinach", "Tomatoes"];

pub const GENERIC_ANALYSIS: &str = "I've analyzed the image and identified several key components. \
The image contains multiple objects that appear to be related. Without more specific context, \
I can only provide a general assessment.";

/// Renders an outcome as markdown. Never fails.
pub fn present<R>(outcome: &AnalysisOutcome, image_hint: &str, rng: &mut R) -> String
where
    R: Rng,
{
    let (kind, message) = match outcome {
        AnalysisOutcome::Success { markdown_text } => return markdown_text.clone(),
        AnalysisOutcome::Failure { kind, message } => (*kind, message),
    };

    let heading = match kind {
        ErrorKind::MissingCredential => "## API Key Error\n\
            Please ensure your OpenAI API key is set as OPENAI_API_KEY in the server environment."
            .to_string(),
        _ => format!(
            "## Error Analyzing Image\nThere was an error processing your request: {message}"
        ),
    };

    format!(
        "{heading}\n\n## Example Mock Data\n{}",
        example_section(image_hint, rng)
    )
}

/// Picks the food or generic generator from the hint (usually the filename).
pub fn example_section<R>(image_hint: &str, rng: &mut R) -> String
where
    R: Rng,
{
    if image_hint.to_lowercase().contains("food") {
        food_analysis(rng)
    } else {
        generic_analysis()
    }
}

pub fn food_analysis<R>(rng: &mut R) -> String
where
    R: Rng,
{
    let count = rng.gen_range(MIN_INGREDIENTS..=MAX_INGREDIENTS);
    let selected: Vec<&str> = INGREDIENT_CATALOG
        .choose_multiple(rng, count)
        .copied()
        .collect();

    let list = selected
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "## Detected Ingredients\n{list}\n\n## Analysis\n{} \
         The combination works well together and could create a flavorful dish.",
        dish_summary(&selected)
    )
}

/// Rule-based one-liner for a set of ingredients; first matching rule wins.
pub fn dish_summary(ingredients: &[&str]) -> &'static str {
    let has = |name: &str| ingredients.iter().any(|item| *item == name);

    if has("Flour") && has("Sugar") {
        "This appears to be ingredients for baking a cake or cookies."
    } else if STARCH_STAPLES.iter().any(|s| has(*s)) {
        "These ingredients could be used to prepare a main dish."
    } else if SALAD_VEGETABLES.iter().any(|s| has(*s)) {
        "These ingredients would make a nutritious salad."
    } else {
        "These ingredients could be combined to create various dishes."
    }
}

pub fn generic_analysis() -> String {
    let items = (1..=5)
        .map(|n| format!("- Item {n}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("## Detected Items\n{items}\n\n## Analysis\n{GENERIC_ANALYSIS}")
}
