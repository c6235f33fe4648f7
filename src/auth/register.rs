//! The registration page for creating a new account with the backend.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    api::models::RegisterRequest,
    auth::{Session, ValidatedPassword, log_in::LogInState, set_session_cookies},
    endpoints,
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner, log_in_register,
        password_input,
    },
};

/// The error shown when the backend rejects a registration without an
/// explanation.
pub const REGISTER_FALLBACK_ERROR_MSG: &str = "Signup failed";

/// The minimum number of characters the password should have to be considered
/// valid on the client side (server-side validation is done on top of this
/// validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 8;

fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()]
            ;

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }

    }
}

fn text_input(name: &str, id: &str, label: &str, input_type: &str, value: &str) -> Markup {
    html! {
        div {
            label for=(id) class=(FORM_LABEL_STYLE) { (label) }

            input
                type=(input_type)
                name=(name)
                id=(id)
                value=(value)
                required
                tabindex="0"
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

struct RegistrationFormErrors<'a> {
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
    form: Option<&'a str>,
}

impl RegistrationFormErrors<'_> {
    fn none() -> Self {
        Self {
            password: None,
            confirm_password: None,
            form: None,
        }
    }
}

fn registration_form(user_data: &RegisterForm, errors: &RegistrationFormErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::REGISTER_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input("name", "name", "Name", "text", &user_data.name))
            (text_input("email", "email", "Email", "email", &user_data.email))
            (text_input("dob", "dob", "Date of Birth", "date", &user_data.dob))
            (password_input("", PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password))

            @if let Some(error_message) = errors.form {
                p class="text-red-500 text-base" { (error_message) }
            }

            button
                type="submit" id="submit-button" tabindex="0"
                class="w-full px-4 py-2 bg-blue-500 dark:bg-blue-600 disabled:bg-blue-700
                    hover:enabled:bg-blue-600 hover:enabled:dark:bg-blue-700 text-white rounded"
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Sign up"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form =
        registration_form(&RegisterForm::default(), &RegistrationFormErrors::none());
    let content = log_in_register("Create your account", &registration_form);
    base("Register", &[], &content).into_response()
}

/// The raw data entered by the user in the registration form.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    /// Date of birth as `YYYY-MM-DD`, straight from the date input.
    pub dob: String,
    pub password: String,
    pub confirm_password: String,
}

/// Handler for registration requests via the POST method.
///
/// Password strength is checked locally before the account is created with
/// the backend. On success the backend's tokens are stored in the session
/// cookies and the client is redirected to the transactions page.
pub async fn post_register(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let validated_password = match ValidatedPassword::new(&user_data.password) {
        Ok(password) => password,
        Err(error) => {
            return registration_form(
                &user_data,
                &RegistrationFormErrors {
                    password: Some(error.to_string().as_ref()),
                    ..RegistrationFormErrors::none()
                },
            )
            .into_response();
        }
    };

    if user_data.password != user_data.confirm_password {
        return registration_form(
            &user_data,
            &RegistrationFormErrors {
                confirm_password: Some("Passwords do not match"),
                ..RegistrationFormErrors::none()
            },
        )
        .into_response();
    }

    let request = RegisterRequest {
        name: user_data.name.clone(),
        email: user_data.email.clone(),
        password: validated_password.as_str().to_owned(),
        dob: user_data.dob.clone(),
    };
    let auth = match state.api_client.register(&request).await {
        Ok(auth) => auth,
        Err(Error::BackendRejected { message, .. }) => {
            let message = if message.trim().is_empty() {
                REGISTER_FALLBACK_ERROR_MSG.to_owned()
            } else {
                message
            };
            return registration_form(
                &user_data,
                &RegistrationFormErrors {
                    form: Some(&message),
                    ..RegistrationFormErrors::none()
                },
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while registering: {error}");
            return registration_form(
                &user_data,
                &RegistrationFormErrors {
                    form: Some("An internal error occurred. Please try again later."),
                    ..RegistrationFormErrors::none()
                },
            )
            .into_response();
        }
    };

    let session = Session {
        access_token: auth.access_token,
        refresh_token: auth.refresh_token,
        user_id: auth.id,
    };
    let jar = set_session_cookies(jar, session, state.cookie_duration);

    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        jar,
    )
        .into_response()
}
