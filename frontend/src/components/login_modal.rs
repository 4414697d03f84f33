use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(PartialEq, Properties, Clone)]
pub struct Props {
    pub username: String,
    pub password: String,
    pub error: Option<String>,
    pub on_username: Callback<String>,
    pub on_password: Callback<String>,
    pub on_submit: Callback<()>,
    pub on_cancel: Callback<()>,
}

#[function_component]
pub fn LoginModal(props: &Props) -> Html {
    let username_input = {
        let on_username = props.on_username.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_username.emit(input.value());
        })
    };
    let password_input = {
        let on_password = props.on_password.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_password.emit(input.value());
        })
    };
    let submit = {
        let on_submit = props.on_submit.clone();
        Callback::from(move |_| on_submit.emit(()))
    };
    let cancel = {
        let on_cancel = props.on_cancel.clone();
        Callback::from(move |_| on_cancel.emit(()))
    };

    html! {
        <div class="modal-backdrop">
            <div class="modal login-modal">
                <h2>{"Login"}</h2>
                <div class="form-field">
                    <label for="username">{"Username"}</label>
                    <input
                        id="username"
                        type="text"
                        placeholder="Enter username"
                        value={props.username.clone()}
                        oninput={username_input}
                    />
                </div>
                <div class="form-field">
                    <label for="password">{"Password"}</label>
                    <input
                        id="password"
                        type="password"
                        placeholder="Enter password"
                        value={props.password.clone()}
                        oninput={password_input}
                    />
                </div>
                if let Some(error) = &props.error {
                    <p class="form-error">{ error }</p>
                }
                <div class="modal-actions">
                    <button class="cancel-btn" onclick={cancel}>{"Cancel"}</button>
                    <button class="confirm-btn" onclick={submit}>{"Login"}</button>
                </div>
            </div>
        </div>
    }
}
