use yew::prelude::*;

use crate::models::Product;

#[derive(Properties, PartialEq)]
pub struct ProductCardProps {
    pub product: Product,
}

#[function_component(ProductCard)]
pub fn product_card(props: &ProductCardProps) -> Html {
    let product = &props.product;

    let css = r#"
        .product-card { width: 160px; border: 1px solid var(--border-color); border-radius: 8px; overflow: hidden; background: white; font-size: 0.85rem; }
        .product-card img { width: 100%; height: 110px; object-fit: cover; background: #f4f4f4; display: block; }
        .product-card .body { padding: 8px; display: flex; flex-direction: column; gap: 4px; }
        .product-card .name { font-weight: 600; color: var(--text-primary); text-decoration: none; }
        .product-card .price { color: var(--accent-color); font-weight: 600; }
        .product-card .regular { color: var(--text-secondary); text-decoration: line-through; margin-left: 6px; font-weight: 400; }
        .product-card .stock { font-size: 0.75rem; }
        .product-card .stock.in { color: var(--accent-color); }
        .product-card .stock.out { color: var(--danger-color); }
    "#;

    let image = product.images.first().map(|img| {
        let alt = if img.alt.is_empty() { product.name.clone() } else { img.alt.clone() };
        html! { <img src={img.src.clone()} alt={alt} loading="lazy" /> }
    });

    let name = match &product.permalink {
        Some(link) => html! { <a class="name" href={link.clone()} target="_blank" rel="noopener">{ &product.name }</a> },
        None => html! { <span class="name">{ &product.name }</span> },
    };

    let regular = if product.is_on_sale() && !product.regular_price.is_empty() {
        html! { <span class="regular">{ format!("${}", product.regular_price) }</span> }
    } else {
        html! { <></> }
    };

    let stock_label = match (product.is_in_stock(), product.stock_quantity) {
        (true, Some(qty)) => format!("In stock ({})", qty),
        (true, None) => "In stock".to_string(),
        (false, _) => product.stock_status.replace("onbackorder", "On backorder").replace("outofstock", "Out of stock"),
    };
    let stock_cls = if product.is_in_stock() { "stock in" } else { "stock out" };

    html! {
        <>
            <style>{ css }</style>
            <div class="product-card">
                { for image }
                <div class="body">
                    { name }
                    <div class="price">{ format!("${}", product.price) }{ regular }</div>
                    <div class={stock_cls}>{ stock_label }</div>
                </div>
            </div>
        </>
    }
}
