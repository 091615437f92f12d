use std::rc::Rc;

use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::components::{chat_area::ChatArea, settings::SettingsModal};
use crate::models::Settings;
use crate::services::{
    catalog::CatalogClient, completion::CompletionClient, conversation::ConversationManager,
    storage::LocalStorage,
};

const GLOBAL_STYLES: &str = r#"
    :root {
        --bg-app: #ffffff;
        --bg-user: #f4f4f4;
        --bg-assistant: #ffffff;
        --border-color: #e5e5e5;
        --text-primary: #333;
        --text-secondary: #666;
        --accent-color: #10a37f;
        --accent-hover: #1a7f64;
        --danger-color: #ef4444;
    }

    * { box-sizing: border-box; }
    body { margin: 0; font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; color: var(--text-primary); }

    .app-container { display: flex; height: 100vh; overflow: hidden; }
    .main-content { flex-grow: 1; display: flex; flex-direction: column; position: relative; background: var(--bg-app); }
    .header { padding: 10px 20px; border-bottom: 1px solid var(--border-color); display: flex; justify-content: space-between; align-items: center; height: 60px; }
    .header h2 { font-size: 1rem; margin: 0; font-weight: 600; overflow: hidden; white-space: nowrap; text-overflow: ellipsis; max-width: 500px; }
    .header-actions { display: flex; gap: 6px; align-items: center; }

    .btn { cursor: pointer; border: 1px solid var(--border-color); background: white; padding: 8px 12px; border-radius: 6px; font-size: 0.9rem; transition: all 0.2s; color: var(--text-primary); }
    .btn:hover { background: #f0f0f0; }
    .btn:disabled { opacity: 0.5; cursor: default; }
    .btn-primary { background: var(--accent-color); color: white; border-color: transparent; }
    .btn-primary:hover { background: var(--accent-hover); }
    .btn-danger { color: var(--danger-color); border-color: var(--danger-color); }
    .btn-danger:hover { background: #fef2f2; }
    .btn-icon { border: none; background: transparent; font-size: 1.2rem; padding: 5px; color: var(--text-secondary); cursor: pointer; }
    .btn-icon:hover { background: rgba(0,0,0,0.05); color: var(--text-primary); }

    .form-input { width: 100%; padding: 8px; border: 1px solid var(--border-color); border-radius: 6px; font-family: inherit; margin-bottom: 10px; }
    .form-input:focus { outline: 2px solid var(--accent-color); border-color: transparent; }

    .markdown-body { line-height: 1.6; font-size: 1rem; }
    .markdown-body pre { background: #2d2d2d; color: #fff; padding: 15px; border-radius: 6px; overflow-x: auto; }
    .markdown-body code { background: #f4f4f4; padding: 2px 4px; border-radius: 4px; font-family: monospace; font-size: 0.9em; }
    .markdown-body pre code { background: transparent; color: inherit; }
    .markdown-body p { margin-top: 0; margin-bottom: 1em; }
"#;

#[function_component(App)]
pub fn app() -> Html {
    let manager = use_memo((), |_| {
        // Clients start unconfigured; `load` applies the stored settings.
        let defaults = Settings::default();
        ConversationManager::load(
            Rc::new(CatalogClient::new(&defaults)),
            Rc::new(CompletionClient::new(&defaults)),
            Rc::new(LocalStorage),
        )
    });
    let trigger = use_force_update();
    let show_settings = use_state(|| false);

    // Re-render whenever the manager changes state
    {
        let manager = manager.clone();
        use_effect_with((), move |_| {
            manager.set_listener(move || trigger.force_update());
        });
    }

    // Open settings on first run so the user can enter credentials
    {
        let show_settings = show_settings.clone();
        let settings = manager.settings();
        use_effect_with((), move |_| {
            if !settings.is_completion_configured() {
                show_settings.set(true);
            }
        });
    }

    // --- ACTIONS ---

    let on_send = {
        let manager = manager.clone();
        Callback::from(move |text: String| {
            let manager = manager.clone();
            spawn_local(async move {
                manager.submit(&text).await;
            });
        })
    };

    let on_stop = {
        let manager = manager.clone();
        Callback::from(move |_| manager.stop())
    };

    let on_retry = {
        let manager = manager.clone();
        Callback::from(move |_| {
            let manager = manager.clone();
            spawn_local(async move {
                manager.retry_last_turn().await;
            });
        })
    };

    let on_clear = {
        let manager = manager.clone();
        Callback::from(move |_| {
            let confirmed = web_sys::window()
                .and_then(|w| w.confirm_with_message("Clear the whole conversation?").ok())
                .unwrap_or(false);
            if confirmed {
                manager.clear();
            }
        })
    };

    let on_settings_save = {
        let manager = manager.clone();
        Callback::from(move |new_settings: Settings| manager.update_settings(new_settings))
    };

    let on_reset_settings = {
        let manager = manager.clone();
        Callback::from(move |_| {
            let confirmed = web_sys::window()
                .and_then(|w| w.confirm_with_message("Reset all settings to default?").ok())
                .unwrap_or(false);
            if confirmed {
                manager.update_settings(Settings::default());
            }
        })
    };

    let close_settings = {
        let show_settings = show_settings.clone();
        Callback::from(move |_| show_settings.set(false))
    };

    let toggle_settings = show_settings.clone();
    let messages = manager.messages();
    let has_messages = !messages.is_empty();
    let can_retry = manager.can_retry()
        && messages.last().map(|m| m.is_error).unwrap_or(false);

    html! {
        <>
            <style>{ GLOBAL_STYLES }</style>
            <div class="app-container">
                <div class="main-content">
                    <div class="header">
                        <h2>{ "Store Assistant" }</h2>
                        <div class="header-actions">
                            <button class="btn" onclick={on_clear} disabled={!has_messages} title="Clear conversation">
                                { "Clear" }
                            </button>
                            <button class="btn-icon" onclick={Callback::from(move |_| toggle_settings.set(!*toggle_settings))} title="Settings">
                                <svg width="24" height="24" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round"><circle cx="12" cy="12" r="3"></circle><path d="M19.4 15a1.65 1.65 0 0 0 .33 1.82l.06.06a2 2 0 0 1 0 2.83 2 2 0 0 1-2.83 0l-.06-.06a1.65 1.65 0 0 0-1.82-.33 1.65 1.65 0 0 0-1 1.51V21a2 2 0 0 1-2 2 2 2 0 0 1-2-2v-.09A1.65 1.65 0 0 0 9 19.4a1.65 1.65 0 0 0-1.82.33l-.06.06a2 2 0 0 1-2.83 0 2 2 0 0 1 0-2.83l.06-.06a1.65 1.65 0 0 0 .33-1.82 1.65 1.65 0 0 0-1.51-1H3a2 2 0 0 1-2-2 2 2 0 0 1 2-2h.09A1.65 1.65 0 0 0 4.6 9a1.65 1.65 0 0 0-.33-1.82l-.06-.06a2 2 0 0 1 0-2.83 2 2 0 0 1 2.83 0l.06.06a1.65 1.65 0 0 0 1.82.33H9a1.65 1.65 0 0 0 1-1.51V3a2 2 0 0 1 2-2 2 2 0 0 1 2 2v.09a1.65 1.65 0 0 0 1 1.51 1.65 1.65 0 0 0 1.82-.33l.06-.06a2 2 0 0 1 2.83 0 2 2 0 0 1 0 2.83l-.06.06a1.65 1.65 0 0 0-.33 1.82V9a1.65 1.65 0 0 0 1.51 1H21a2 2 0 0 1 2 2 2 2 0 0 1-2 2h-.09a1.65 1.65 0 0 0-1.51 1z"></path></svg>
                            </button>
                        </div>
                    </div>

                    if *show_settings {
                        <SettingsModal
                            settings={manager.settings()}
                            on_save={on_settings_save}
                            on_close={close_settings}
                            on_reset={on_reset_settings}
                        />
                    }

                    <ChatArea
                        messages={messages}
                        is_loading={manager.is_sending()}
                        error={manager.error()}
                        can_retry={can_retry}
                        on_send={on_send}
                        on_stop={on_stop}
                        on_retry={on_retry}
                    />
                </div>
            </div>
        </>
    }
}
