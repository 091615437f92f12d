use crate::models::{ChatMessage, Message, Product, Role};
use crate::utils::{strip_html, truncate_chars};

pub const SYSTEM_INSTRUCTION: &str = "You are a helpful shopping assistant for an online store. \
Answer questions about the store's products using the product information supplied with each \
question. Never invent products, prices or stock levels.";

const PREAMBLE: &str = "Answer the customer's question in a friendly, concise tone. Only \
recommend products from the list below, mention prices and availability when relevant, and say \
so plainly if none of them fit.";

pub const NO_MATCHES: &str = "No products in the catalog matched this question.";
pub const CATALOG_UNAVAILABLE: &str = "Product information is currently unavailable.";

const DESCRIPTION_CHARS: usize = 100;

fn product_summary(product: &Product) -> String {
    let description = strip_html(&product.description);
    let description = if description.is_empty() {
        strip_html(&product.short_description)
    } else {
        description
    };
    truncate_chars(&description, DESCRIPTION_CHARS)
}

pub fn render_product_line(product: &Product) -> String {
    let mut details = format!(
        "Price: ${}, Stock: {}",
        product.price, product.stock_status
    );
    if product.is_on_sale() && !product.regular_price.is_empty() {
        details.push_str(&format!(", On sale from ${}", product.regular_price));
    }
    format!("{}: {} ({})", product.name, product_summary(product), details)
}

/// One line per product, or the fallback sentence when nothing matched.
pub fn render_context_block(products: &[Product]) -> String {
    if products.is_empty() {
        return NO_MATCHES.to_string();
    }
    products
        .iter()
        .map(render_product_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// The content actually sent upstream for the user's turn.
pub fn build_user_turn(context_block: &str, question: &str) -> String {
    format!(
        "{}\n\nRelevant products:\n{}\n\nQuestion: {}",
        PREAMBLE, context_block, question
    )
}

/// System instruction, then every completed turn of `history`, then the new
/// user turn. Failed and aborted turns are left out.
pub fn build_window(history: &[Message], user_turn: &str) -> Vec<ChatMessage> {
    let mut window = vec![ChatMessage::new(Role::System, SYSTEM_INSTRUCTION)];

    let mut pending_user: Option<&Message> = None;
    for msg in history {
        match msg.role {
            Role::User => pending_user = Some(msg),
            Role::Assistant if !msg.is_error => {
                if let Some(user) = pending_user.take() {
                    window.push(ChatMessage::new(Role::User, user.content.clone()));
                    window.push(ChatMessage::new(Role::Assistant, msg.content.clone()));
                }
            }
            _ => pending_user = None,
        }
    }

    window.push(ChatMessage::new(Role::User, user_turn));
    window
}
