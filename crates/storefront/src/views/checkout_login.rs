//! Checkout login page view.
//!
//! A signed-in customer never sees this page; they are sent straight to
//! checkout. Everyone else chooses between continuing as a guest and signing
//! in, with a password reset overlay one click away.

use larkspur_core::User;

use super::{Button, ViewContext};
use crate::i18n::Message;
use crate::routes::paths;

pub const GUEST_BUTTON_TEST_ID: &str = "checkoutAsGuestButton";
pub const FORGOT_PASSWORD_TEST_ID: &str = "forgottenPasswordButton";

/// Query parameter that opens an overlay.
pub const OVERLAY_PARAM: &str = "overlay";

/// Overlay requested through the query string.
///
/// Lives only in the URL: navigating anywhere else closes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Overlay {
    #[default]
    None,
    PasswordReset,
}

impl Overlay {
    /// Parse the `overlay` query parameter. Unknown values open nothing.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("password") => Self::PasswordReset,
            _ => Self::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutLoginPage {
    /// A customer is already signed in.
    Redirect(String),
    Form(Box<LoginForm>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub guest: GuestPanel,
    pub sign_in: SignInPanel,
    pub password_reset: Option<PasswordResetOverlay>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestPanel {
    pub title: &'static str,
    pub message: &'static str,
    pub button: Button,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInPanel {
    pub title: &'static str,
    pub action: &'static str,
    /// Email to pre-fill after a failed attempt.
    pub email: String,
    pub error: Option<&'static str>,
    pub forgot_password: Button,
}

/// Password reset form, shown over the page from the right-hand side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetOverlay {
    pub title: &'static str,
    pub message: &'static str,
    pub action: &'static str,
    pub close_href: &'static str,
}

/// Inputs from a failed sign-in, carried into the re-render.
#[derive(Debug, Clone, Default)]
pub struct SignInAttempt {
    pub email: String,
    pub error: Option<Message>,
}

/// Compose the checkout login page.
#[must_use]
pub fn compose(
    user: Option<&User>,
    overlay: Overlay,
    attempt: SignInAttempt,
    ctx: &ViewContext,
) -> CheckoutLoginPage {
    if user.is_some() {
        return CheckoutLoginPage::Redirect(ctx.links.checkout.clone());
    }

    let locale = ctx.locale;
    let password_reset = (overlay == Overlay::PasswordReset).then(|| PasswordResetOverlay {
        title: locale.text(Message::ResetPasswordTitle),
        message: locale.text(Message::ResetPasswordMessage),
        action: paths::PASSWORD_RESET,
        close_href: paths::CHECKOUT_LOGIN,
    });

    CheckoutLoginPage::Form(Box::new(LoginForm {
        guest: GuestPanel {
            title: locale.text(Message::GuestTitle),
            message: locale.text(Message::GuestMessage),
            button: Button {
                href: ctx.links.checkout.clone(),
                testing_context: GUEST_BUTTON_TEST_ID,
                label: locale.text(Message::ContinueAsGuest),
            },
        },
        sign_in: SignInPanel {
            title: locale.text(Message::SignInTitle),
            action: paths::CHECKOUT_LOGIN,
            email: attempt.email,
            error: attempt.error.map(|message| locale.text(message)),
            forgot_password: Button {
                href: format!("{}?{OVERLAY_PARAM}=password", paths::CHECKOUT_LOGIN),
                testing_context: FORGOT_PASSWORD_TEST_ID,
                label: locale.text(Message::ForgotPassword),
            },
        },
        password_reset,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use larkspur_core::{Email, PriceDisplay, UserId};

    use super::*;
    use crate::i18n::Locale;
    use crate::views::Links;

    fn ctx() -> ViewContext {
        ViewContext {
            links: Links::new(&url::Url::parse("https://shop.example.com/").unwrap()),
            locale: Locale::En,
            price_display: PriceDisplay::Gross,
        }
    }

    fn form(page: CheckoutLoginPage) -> LoginForm {
        match page {
            CheckoutLoginPage::Form(form) => *form,
            CheckoutLoginPage::Redirect(to) => panic!("unexpected redirect to {to}"),
        }
    }

    #[test]
    fn test_signed_in_user_is_redirected_to_checkout() {
        let user = User {
            id: UserId::new("VXNlcjox"),
            email: Email::parse("ada@example.com").unwrap(),
            first_name: None,
            last_name: None,
        };
        let page = compose(Some(&user), Overlay::PasswordReset, SignInAttempt::default(), &ctx());
        assert_eq!(page, CheckoutLoginPage::Redirect("/checkout".to_string()));
    }

    #[test]
    fn test_guest_sees_both_options() {
        let form = form(compose(None, Overlay::None, SignInAttempt::default(), &ctx()));
        assert_eq!(form.guest.button.href, "/checkout");
        assert_eq!(form.sign_in.action, "/checkout/login");
        assert_eq!(form.sign_in.forgot_password.href, "/checkout/login?overlay=password");
        assert!(form.sign_in.error.is_none());
        assert!(form.password_reset.is_none());
    }

    #[test]
    fn test_overlay_follows_query_param() {
        assert_eq!(Overlay::from_param(Some("password")), Overlay::PasswordReset);
        assert_eq!(Overlay::from_param(Some("cart")), Overlay::None);
        assert_eq!(Overlay::from_param(None), Overlay::None);

        let form = form(compose(None, Overlay::PasswordReset, SignInAttempt::default(), &ctx()));
        let overlay = form.password_reset.unwrap();
        assert_eq!(overlay.action, "/checkout/password-reset");
        assert_eq!(overlay.close_href, "/checkout/login");
    }

    #[test]
    fn test_failed_attempt_is_shown_inline() {
        let attempt = SignInAttempt {
            email: "ada@example.com".to_string(),
            error: Some(Message::InvalidCredentials),
        };
        let form = form(compose(None, Overlay::None, attempt, &ctx()));
        assert_eq!(form.sign_in.email, "ada@example.com");
        assert_eq!(form.sign_in.error, Some("Please, enter valid credentials"));
    }
}
