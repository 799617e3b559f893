//! UI strings and locale negotiation.
//!
//! A fixed catalog with English as the default and Polish as the one
//! translation. The locale is picked per request from `Accept-Language`.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header::ACCEPT_LANGUAGE, request::Parts},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    Pl,
}

impl Locale {
    /// BCP 47 tag, as used in `<html lang>`.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Pl => "pl",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next()?.trim();
        if primary.eq_ignore_ascii_case("en") {
            Some(Self::En)
        } else if primary.eq_ignore_ascii_case("pl") {
            Some(Self::Pl)
        } else {
            None
        }
    }

    /// Pick the best supported locale from an `Accept-Language` value.
    ///
    /// Honors `q` weights; ties keep header order. Falls back to English.
    #[must_use]
    pub fn negotiate(accept_language: Option<&str>) -> Self {
        let Some(header) = accept_language else {
            return Self::default();
        };

        let mut best: Option<(Self, f32)> = None;
        for entry in header.split(',') {
            let mut parts = entry.split(';');
            let tag = parts.next().unwrap_or_default().trim();
            let weight = parts
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);
            if let Some(locale) = Self::from_tag(tag)
                && weight > 0.0
                && best.is_none_or(|(_, w)| weight > w)
            {
                best = Some((locale, weight));
            }
        }
        best.map_or_else(Self::default, |(locale, _)| locale)
    }

    /// Look up a UI string.
    #[must_use]
    pub const fn text(self, message: Message) -> &'static str {
        match self {
            Self::En => english(message),
            Self::Pl => polish(message),
        }
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::negotiate(
            parts
                .headers
                .get(ACCEPT_LANGUAGE)
                .and_then(|v| v.to_str().ok()),
        ))
    }
}

/// Every string the storefront renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    CartTitle,
    CartEmptyTitle,
    CartEmptyMessage,
    ContinueShopping,
    ProceedToCheckout,
    ColumnProducts,
    ColumnPrice,
    ColumnQuantity,
    ColumnTotalPrice,
    Subtotal,
    Shipping,
    Discount,
    Total,
    Remove,
    Update,
    ItemAdded,
    CartUpdated,
    CartUpdateFailed,
    GuestTitle,
    GuestMessage,
    ContinueAsGuest,
    SignInTitle,
    Email,
    Password,
    SignIn,
    ForgotPassword,
    ResetPasswordTitle,
    ResetPasswordMessage,
    SendResetLink,
    Close,
    ResetLinkSent,
    InvalidCredentials,
    InvalidEmail,
    SignedIn,
    SignedOut,
    SignOut,
    CheckoutTitle,
    CheckoutMessage,
    BackToCart,
    Items,
    Guest,
}

const fn english(message: Message) -> &'static str {
    match message {
        Message::CartTitle => "My Cart",
        Message::CartEmptyTitle => "Your bag is empty",
        Message::CartEmptyMessage => {
            "You haven't added anything to your bag. We're sure you'll find something in our store"
        }
        Message::ContinueShopping => "CONTINUE SHOPPING",
        Message::ProceedToCheckout => "PROCEED TO CHECKOUT",
        Message::ColumnProducts => "Products",
        Message::ColumnPrice => "Price",
        Message::ColumnQuantity => "Quantity",
        Message::ColumnTotalPrice => "Total Price",
        Message::Subtotal => "Subtotal",
        Message::Shipping => "Shipping",
        Message::Discount => "Promo code",
        Message::Total => "Total",
        Message::Remove => "Remove",
        Message::Update => "Update",
        Message::ItemAdded => "Added to your cart",
        Message::CartUpdated => "Your cart has been updated",
        Message::CartUpdateFailed => "We couldn't update your cart",
        Message::GuestTitle => "Continue as a guest",
        Message::GuestMessage => {
            "If you don't wish to register an account, don't worry. You can checkout as a guest. We care about you just as much as any registered user."
        }
        Message::ContinueAsGuest => "CONTINUE AS A GUEST",
        Message::SignInTitle => "Registered user",
        Message::Email => "Email Address",
        Message::Password => "Password",
        Message::SignIn => "SIGN IN",
        Message::ForgotPassword => "Forgotten password?",
        Message::ResetPasswordTitle => "Reset your password",
        Message::ResetPasswordMessage => {
            "Please provide us your email address so we can share you a link to reset your password"
        }
        Message::SendResetLink => "RESET PASSWORD",
        Message::Close => "Close",
        Message::ResetLinkSent => "Check your inbox for a link to reset your password",
        Message::InvalidCredentials => "Please, enter valid credentials",
        Message::InvalidEmail => "Please, enter a valid email address",
        Message::SignedIn => "You are now logged in",
        Message::SignedOut => "You are now logged out",
        Message::SignOut => "Log out",
        Message::CheckoutTitle => "Checkout",
        Message::CheckoutMessage => "Shipping and payment steps follow from here.",
        Message::BackToCart => "Back to cart",
        Message::Items => "Items",
        Message::Guest => "Guest",
    }
}

const fn polish(message: Message) -> &'static str {
    match message {
        Message::CartTitle => "Mój koszyk",
        Message::CartEmptyTitle => "Twój koszyk jest pusty",
        Message::CartEmptyMessage => {
            "Nie dodałeś jeszcze nic do koszyka. Na pewno znajdziesz coś w naszym sklepie"
        }
        Message::ContinueShopping => "KONTYNUUJ ZAKUPY",
        Message::ProceedToCheckout => "PRZEJDŹ DO KASY",
        Message::ColumnProducts => "Produkty",
        Message::ColumnPrice => "Cena",
        Message::ColumnQuantity => "Ilość",
        Message::ColumnTotalPrice => "Cena łączna",
        Message::Subtotal => "Suma częściowa",
        Message::Shipping => "Dostawa",
        Message::Discount => "Kod promocyjny",
        Message::Total => "Razem",
        Message::Remove => "Usuń",
        Message::Update => "Aktualizuj",
        Message::ItemAdded => "Dodano do koszyka",
        Message::CartUpdated => "Koszyk został zaktualizowany",
        Message::CartUpdateFailed => "Nie udało się zaktualizować koszyka",
        Message::GuestTitle => "Kontynuuj jako gość",
        Message::GuestMessage => {
            "Jeśli nie chcesz zakładać konta, możesz złożyć zamówienie jako gość."
        }
        Message::ContinueAsGuest => "KONTYNUUJ JAKO GOŚĆ",
        Message::SignInTitle => "Zarejestrowany użytkownik",
        Message::Email => "Adres e-mail",
        Message::Password => "Hasło",
        Message::SignIn => "ZALOGUJ SIĘ",
        Message::ForgotPassword => "Nie pamiętasz hasła?",
        Message::ResetPasswordTitle => "Zresetuj hasło",
        Message::ResetPasswordMessage => {
            "Podaj swój adres e-mail, a wyślemy Ci link do zresetowania hasła"
        }
        Message::SendResetLink => "ZRESETUJ HASŁO",
        Message::Close => "Zamknij",
        Message::ResetLinkSent => "Sprawdź skrzynkę, wysłaliśmy link do zresetowania hasła",
        Message::InvalidCredentials => "Podaj poprawne dane logowania",
        Message::InvalidEmail => "Podaj poprawny adres e-mail",
        Message::SignedIn => "Zalogowano",
        Message::SignedOut => "Wylogowano",
        Message::SignOut => "Wyloguj",
        Message::CheckoutTitle => "Kasa",
        Message::CheckoutMessage => "Tutaj zaczynają się kroki dostawy i płatności.",
        Message::BackToCart => "Wróć do koszyka",
        Message::Items => "Produkty",
        Message::Guest => "Gość",
    }
}
