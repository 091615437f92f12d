use crate::models::Product;

pub const MAX_RELEVANT_PRODUCTS: usize = 5;

const BODY_MATCH_WEIGHT: u32 = 1;
const NAME_MATCH_WEIGHT: u32 = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct ScoredProduct {
    pub product: Product,
    pub score: u32,
}

/// Lowercase words longer than two characters.
pub fn keywords(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

fn searchable_text(product: &Product) -> String {
    let mut blob = format!(
        "{} {} {}",
        product.name, product.description, product.short_description
    );
    for category in &product.categories {
        blob.push(' ');
        blob.push_str(&category.name);
    }
    blob.to_lowercase()
}

pub fn score_product(product: &Product, keywords: &[String]) -> u32 {
    let blob = searchable_text(product);
    let name = product.name.to_lowercase();

    keywords.iter().fold(0, |score, kw| {
        let mut score = score;
        if blob.contains(kw.as_str()) {
            score += BODY_MATCH_WEIGHT;
        }
        if name.contains(kw.as_str()) {
            score += NAME_MATCH_WEIGHT;
        }
        score
    })
}

/// Ranks `products` against `query`. Zero scores are dropped, ties keep
/// catalog order, and at most `MAX_RELEVANT_PRODUCTS` are returned.
pub fn rank_products(query: &str, products: &[Product]) -> Vec<ScoredProduct> {
    let keywords = keywords(query);
    if keywords.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<ScoredProduct> = products
        .iter()
        .filter_map(|product| {
            let score = score_product(product, &keywords);
            (score > 0).then(|| ScoredProduct {
                product: product.clone(),
                score,
            })
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(MAX_RELEVANT_PRODUCTS);
    scored
}

pub fn relevant_products(query: &str, products: &[Product]) -> Vec<Product> {
    rank_products(query, products)
        .into_iter()
        .map(|scored| scored.product)
        .collect()
}
