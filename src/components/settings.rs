use anyhow::Context;
use yew::prelude::*;
use web_sys::HtmlInputElement;
use wasm_bindgen_futures::spawn_local;

use crate::models::Settings;
use crate::services::catalog::{CatalogClient, CatalogSource, ProductQuery};

#[derive(Properties, PartialEq, Clone)]
pub struct SettingsProps {
    pub settings: Settings,
    pub on_save: Callback<Settings>,
    pub on_close: Callback<()>,
    pub on_reset: Callback<()>,
}

/// Fetches a single product to check the store URL and credentials.
async fn test_store_connection(settings: Settings) -> anyhow::Result<usize> {
    let client = CatalogClient::new(&settings);
    let query = ProductQuery {
        per_page: 1,
        ..ProductQuery::default()
    };
    let products = client
        .fetch_products(&query)
        .await
        .context("Store connection failed")?;
    Ok(products.len())
}

#[function_component(SettingsModal)]
pub fn settings_modal(props: &SettingsProps) -> Html {
    let draft = use_state(|| props.settings.clone());
    let status_msg = use_state(|| None::<Result<String, String>>);

    let field = |apply: fn(&mut Settings, String)| {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let mut next = (*draft).clone();
            apply(&mut next, input.value());
            draft.set(next);
        })
    };
    let on_api_key = field(|s, v| s.api_key = v);
    let on_model = field(|s, v| s.model = v);
    let on_store_url = field(|s, v| s.store_url = v);
    let on_consumer_key = field(|s, v| s.consumer_key = v);
    let on_consumer_secret = field(|s, v| s.consumer_secret = v);

    let on_save_click = {
        let on_save = props.on_save.clone();
        let on_close = props.on_close.clone();
        let draft = draft.clone();
        Callback::from(move |_| {
            on_save.emit((*draft).clone());
            on_close.emit(());
        })
    };

    let on_test = {
        let draft = draft.clone();
        let status = status_msg.clone();
        Callback::from(move |_| {
            let settings = (*draft).clone();
            let status = status.clone();
            spawn_local(async move {
                match test_store_connection(settings).await {
                    Ok(count) => status.set(Some(Ok(format!("Connected ({} product{} returned)", count, if count == 1 { "" } else { "s" })))),
                    Err(e) => status.set(Some(Err(format!("{:#}", e)))),
                }
            });
        })
    };

    let on_reset_click = {
        let cb = props.on_reset.clone();
        let on_close = props.on_close.clone();
        Callback::from(move |_| {
            cb.emit(());
            on_close.emit(());
        })
    };

    let css = r#"
        .settings-backdrop { position: absolute; top: 0; left: 0; width: 100%; height: 100%; background: rgba(255,255,255,0.6); backdrop-filter: blur(2px); z-index: 99; cursor: pointer; }
        .settings-panel { position: absolute; top: 60px; right: 20px; width: 360px; background: white; border: 1px solid var(--border-color); border-radius: 8px; box-shadow: 0 10px 15px -3px rgba(0, 0, 0, 0.1); padding: 20px; z-index: 100; display: flex; flex-direction: column; gap: 12px; }
        .settings-header { display: flex; justify-content: space-between; align-items: center; border-bottom: 1px solid var(--border-color); padding-bottom: 10px; margin-bottom: 5px; }
        .settings-header h3 { margin: 0; font-size: 1.1rem; }
        .settings-section { font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.05em; color: var(--text-secondary); margin: 4px 0 0; }
        .close-btn { background: none; border: none; font-size: 1.5rem; line-height: 1; cursor: pointer; color: var(--text-secondary); padding: 0 5px; }
        .close-btn:hover { color: var(--text-primary); }
        .form-label { display: block; font-size: 0.85rem; font-weight: 600; margin-bottom: 5px; color: var(--text-secondary); }
        .actions { margin-top: 10px; display: flex; flex-direction: column; gap: 8px; }
        .status-ok { color: var(--accent-color); font-size: 0.8rem; }
        .status-err { color: var(--danger-color); font-size: 0.8rem; }
    "#;

    let status_html = match &*status_msg {
        Some(Ok(msg)) => html! { <div class="status-ok">{ msg }</div> },
        Some(Err(msg)) => html! { <div class="status-err">{ msg }</div> },
        None => html! { <></> },
    };

    html! {
        <>
            <style>{ css }</style>
            <div class="settings-backdrop" onclick={props.on_close.reform(|_| ())}></div>

            <div class="settings-panel">
                <div class="settings-header">
                    <h3>{ "Configuration" }</h3>
                    <button class="close-btn" onclick={props.on_close.reform(|_| ())} title="Close">{"×"}</button>
                </div>

                <p class="settings-section">{ "Assistant" }</p>
                <div>
                    <label class="form-label">{ "OpenAI API Key" }</label>
                    <input class="form-input" type="password" value={draft.api_key.clone()} oninput={on_api_key} placeholder="sk-..." />
                </div>
                <div>
                    <label class="form-label">{ "Model" }</label>
                    <input class="form-input" type="text" value={draft.model.clone()} oninput={on_model} />
                </div>

                <p class="settings-section">{ "Store" }</p>
                <div>
                    <label class="form-label">{ "Store URL" }</label>
                    <input class="form-input" type="text" value={draft.store_url.clone()} oninput={on_store_url} placeholder="https://shop.example.com" />
                </div>
                <div>
                    <label class="form-label">{ "Consumer Key" }</label>
                    <input class="form-input" type="text" value={draft.consumer_key.clone()} oninput={on_consumer_key} placeholder="ck_..." />
                </div>
                <div>
                    <label class="form-label">{ "Consumer Secret" }</label>
                    <input class="form-input" type="password" value={draft.consumer_secret.clone()} oninput={on_consumer_secret} placeholder="cs_..." />
                </div>
                <button class="btn" onclick={on_test} disabled={!draft.is_store_configured()}>{ "Test Store Connection" }</button>
                { status_html }

                <div class="actions">
                    <button class="btn btn-primary" onclick={on_save_click}>{ "Save" }</button>
                    <hr style="width: 100%; border: 0; border-top: 1px solid var(--border-color);" />
                    <button class="btn" onclick={on_reset_click}>{ "Reset Settings" }</button>
                </div>
            </div>
        </>
    }
}
