use yew::prelude::*;
use web_sys::{HtmlElement, HtmlTextAreaElement};

use crate::components::product_card::ProductCard;
use crate::models::{Message, Role};
use crate::utils::render_markdown;

#[derive(Properties, PartialEq)]
pub struct ChatAreaProps {
    pub messages: Vec<Message>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub can_retry: bool,
    pub on_send: Callback<String>,
    pub on_stop: Callback<()>,
    pub on_retry: Callback<()>,
}

#[function_component(ChatArea)]
pub fn chat_area(props: &ChatAreaProps) -> Html {
    let input_text = use_state(String::new);
    let scroll_ref = use_node_ref();

    // Track if the user is currently at the bottom of the chat
    let is_at_bottom = use_state(|| true);

    // Auto-scroll effect
    {
        let div_ref = scroll_ref.clone();
        let is_at_bottom_val = *is_at_bottom;
        let len = props.messages.len();
        let loading = props.is_loading;

        use_effect_with((len, loading), move |_| {
            if is_at_bottom_val {
                if let Some(div) = div_ref.cast::<HtmlElement>() {
                    div.set_scroll_top(div.scroll_height());
                }
            }
        });
    }

    let on_scroll = {
        let is_at_bottom = is_at_bottom.clone();
        Callback::from(move |e: Event| {
            let div: HtmlElement = e.target_unchecked_into();
            let distance_from_bottom = div.scroll_height() - div.scroll_top() - div.client_height();
            let currently_at_bottom = distance_from_bottom < 35;

            if *is_at_bottom != currently_at_bottom {
                is_at_bottom.set(currently_at_bottom);
            }
        })
    };

    let send = {
        let text = input_text.clone();
        let on_send = props.on_send.clone();
        let is_at_bottom = is_at_bottom.clone();
        let is_loading = props.is_loading;
        move || {
            if is_loading || text.trim().is_empty() {
                return;
            }
            on_send.emit((*text).clone());
            text.set(String::new());
            is_at_bottom.set(true);
        }
    };

    let on_submit = {
        let send = send.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            send();
        })
    };

    let on_keydown = Callback::from(move |e: KeyboardEvent| {
        if e.key() == "Enter" && !e.shift_key() {
            e.prevent_default();
            send();
        }
    });

    let on_input = {
        let text = input_text.clone();
        Callback::from(move |e: InputEvent| {
            let i: HtmlTextAreaElement = e.target_unchecked_into();
            text.set(i.value());
        })
    };

    let css = r#"
        .messages-container {
            flex-grow: 1;
            overflow-y: auto;
            padding: 20px;
            display: flex;
            flex-direction: column;
            gap: 15px;
            background-color: #ffffff;
            scroll-behavior: smooth;
        }

        /* Row Layout */
        .message-row { display: flex; width: 100%; }
        .message-row.user { justify-content: flex-end; }
        .message-row.assistant { justify-content: flex-start; }

        /* Bubble Container */
        .bubble-group { display: flex; gap: 10px; max-width: 85%; align-items: flex-end; }
        .message-row.user .bubble-group { flex-direction: row-reverse; }

        /* Avatars */
        .avatar { width: 32px; height: 32px; border-radius: 50%; display: flex; align-items: center; justify-content: center; flex-shrink: 0; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        .avatar.user { background: #555; color: white; }
        .avatar.assistant { background: var(--accent-color); color: white; }

        /* Text Bubble */
        .msg-bubble {
            padding: 10px 15px;
            border-radius: 12px;
            font-size: 0.95rem;
            line-height: 1.5;
            box-shadow: 0 1px 2px rgba(0,0,0,0.05);
            min-width: 0;
            overflow-wrap: anywhere;
            word-break: break-word;
            max-width: 100%;
        }

        .message-row.user .msg-bubble { background-color: #e3f2fd; color: #1565c0; border-bottom-right-radius: 2px; }
        .message-row.assistant .msg-bubble { background-color: #f5f5f5; color: #333; border-bottom-left-radius: 2px; }
        .message-row.assistant .msg-bubble.error { background-color: #fef2f2; color: #991b1b; border: 1px solid #fecaca; }

        .msg-time { font-size: 0.7rem; color: var(--text-secondary); margin-top: 4px; }

        .product-list { display: flex; gap: 10px; flex-wrap: wrap; margin-top: 8px; }

        .retry-row { display: flex; justify-content: center; gap: 10px; align-items: center; font-size: 0.85rem; color: var(--danger-color); }

        /* Input Area Styles */
        .input-wrapper { border-top: 1px solid var(--border-color); padding: 20px; display: flex; justify-content: center; background: white; position: relative; }
        .input-container { width: 100%; max-width: 900px; position: relative; display: flex; flex-direction: column; }
        .chat-input { width: 100%; padding: 12px; padding-right: 45px; border: 1px solid var(--border-color); border-radius: 8px; box-shadow: 0 2px 5px rgba(0,0,0,0.05); resize: none; font-family: inherit; outline: none; transition: border 0.2s; }
        .chat-input:focus { border-color: var(--accent-color); box-shadow: 0 0 0 2px rgba(16, 163, 127, 0.1); }
        .send-btn { position: absolute; right: 8px; bottom: 8px; background: var(--accent-color); color: white; border: none; border-radius: 4px; padding: 6px 10px; cursor: pointer; transition: opacity 0.2s; }
        .send-btn:disabled { background: #ccc; cursor: default; }
        .send-btn:hover:not(:disabled) { background: var(--accent-hover); }

        .empty-state { margin: auto; text-align: center; color: var(--text-secondary); max-width: 420px; }
    "#;

    let user_icon = html! {
        <svg width="20" height="20" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">
            <path d="M20 21v-2a4 4 0 0 0-4-4H8a4 4 0 0 0-4 4v2"></path>
            <circle cx="12" cy="7" r="4"></circle>
        </svg>
    };
    let bot_icon = html! {
        <svg width="20" height="20" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">
            <rect x="3" y="11" width="18" height="10" rx="2"></rect>
            <circle cx="12" cy="5" r="2"></circle>
            <path d="M12 7v4"></path>
            <line x1="8" y1="16" x2="8" y2="16"></line>
            <line x1="16" y1="16" x2="16" y2="16"></line>
        </svg>
    };

    let retry_row = if props.can_retry && !props.is_loading {
        let error = props.error.clone().unwrap_or_default();
        html! {
            <div class="retry-row">
                <span>{ error }</span>
                <button class="btn" onclick={props.on_retry.reform(|_| ())}>{ "Retry" }</button>
            </div>
        }
    } else {
        html! { <></> }
    };

    html! {
        <>
            <style>{ css }</style>

            <div class="messages-container" ref={scroll_ref} onscroll={on_scroll}>
                if props.messages.is_empty() && !props.is_loading {
                    <div class="empty-state">
                        { "Ask about products in your store: availability, prices, or recommendations." }
                    </div>
                }

                { for props.messages.iter().map(|msg| {
                    let (role_cls, icon) = match msg.role {
                        Role::User => ("user", user_icon.clone()),
                        _ => ("assistant", bot_icon.clone()),
                    };
                    let bubble_cls = if msg.is_error { "msg-bubble error" } else { "msg-bubble" };
                    let time = msg.created_at.with_timezone(&chrono::Local).format("%H:%M").to_string();

                    let products_html = match &msg.products {
                        Some(products) if !products.is_empty() => html! {
                            <div class="product-list">
                                { for products.iter().map(|p| html! { <ProductCard key={p.id} product={p.clone()} /> }) }
                            </div>
                        },
                        _ => html! { <></> },
                    };

                    html! {
                        <div key={msg.id.clone()} class={format!("message-row {}", role_cls)}>
                            <div class="bubble-group">
                                <div class={format!("avatar {}", role_cls)}>{ icon }</div>
                                <div>
                                    <div class={bubble_cls}>{ render_markdown(&msg.content) }</div>
                                    { products_html }
                                    <div class="msg-time">{ time }</div>
                                </div>
                            </div>
                        </div>
                    }
                })}

                if props.is_loading {
                    <div class="message-row assistant">
                        <div class="bubble-group">
                            <div class="avatar assistant">{ bot_icon.clone() }</div>
                            <div class="msg-bubble" style="color: #888; font-style: italic;">
                                { "Thinking..." }
                            </div>
                        </div>
                    </div>
                }

                { retry_row }
            </div>

            <div class="input-wrapper">
                <form class="input-container" onsubmit={on_submit}>
                    <textarea
                        class="chat-input"
                        rows="1"
                        placeholder="Ask about your products..."
                        value={(*input_text).clone()}
                        oninput={on_input}
                        onkeydown={on_keydown}
                        disabled={props.is_loading}
                        style="height: 50px; overflow-y: hidden;"
                    />

                    if props.is_loading {
                        <button
                            type="button"
                            class="send-btn"
                            style="background: var(--danger-color);"
                            onclick={props.on_stop.reform(|_| ())}
                        >
                            { "Stop" }
                        </button>
                    } else {
                        <button type="submit" class="send-btn" disabled={input_text.trim().is_empty()}>
                            { "Send" }
                        </button>
                    }
                </form>
            </div>
        </>
    }
}
