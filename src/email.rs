//! Order confirmation emails.
//!
//! Two plain-text messages are sent per order: a confirmation to the
//! customer and a notification to the shop. Both go through a [`Mailer`];
//! production uses SMTP, tests substitute a recording double.

use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use strum::{AsRefStr, EnumString};
use thiserror::Error;

use crate::config::MailConfig;
use crate::models::{Order, OrderItem};

/// Language of outgoing emails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Locale {
    #[default]
    Fr,
    En,
}

/// Fixed template fragments for one locale.
#[derive(Debug)]
pub struct TemplateStrings {
    pub subject: &'static str,
    pub greeting: &'static str,
    pub thanks: &'static str,
    pub order_reference: &'static str,
    pub ordered_items: &'static str,
    pub total_amount: &'static str,
    pub shipping_address: &'static str,
    pub phone: &'static str,
    pub phone_missing: &'static str,
    pub processing_notice: &'static str,
    pub sign_off: &'static str,
    pub team: &'static str,
    pub quantity: &'static str,
    pub price: &'static str,
    pub new_order: &'static str,
    pub reference: &'static str,
    pub customer: &'static str,
    pub name: &'static str,
    pub address: &'static str,
    pub items: &'static str,
    pub total: &'static str,
    pub automated_footer: &'static str,
}

const FR: TemplateStrings = TemplateStrings {
    subject: "Confirmation commande",
    greeting: "Cher/Chère",
    thanks: "Merci pour votre commande ! Voici le récapitulatif :",
    order_reference: "RÉFÉRENCE DE COMMANDE",
    ordered_items: "ARTICLES COMMANDÉS",
    total_amount: "MONTANT TOTAL",
    shipping_address: "ADRESSE DE LIVRAISON",
    phone: "Téléphone",
    phone_missing: "Non renseigné",
    processing_notice: "Votre commande sera traitée dans les plus brefs délais.",
    sign_off: "Cordialement,",
    team: "L'équipe LUXIO",
    quantity: "Quantité",
    price: "Prix",
    new_order: "NOUVELLE COMMANDE REÇUE",
    reference: "RÉFÉRENCE",
    customer: "CLIENT",
    name: "Nom",
    address: "ADRESSE",
    items: "ARTICLES",
    total: "TOTAL",
    automated_footer: "Système automatisé LUXIO",
};

const EN: TemplateStrings = TemplateStrings {
    subject: "Order confirmation",
    greeting: "Dear",
    thanks: "Thank you for your order! Here is a summary:",
    order_reference: "ORDER REFERENCE",
    ordered_items: "ORDERED ITEMS",
    total_amount: "TOTAL AMOUNT",
    shipping_address: "SHIPPING ADDRESS",
    phone: "Phone",
    phone_missing: "Not provided",
    processing_notice: "Your order will be processed as soon as possible.",
    sign_off: "Kind regards,",
    team: "The LUXIO team",
    quantity: "Quantity",
    price: "Price",
    new_order: "NEW ORDER RECEIVED",
    reference: "REFERENCE",
    customer: "CUSTOMER",
    name: "Name",
    address: "ADDRESS",
    items: "ITEMS",
    total: "TOTAL",
    automated_footer: "LUXIO automated system",
};

impl Locale {
    pub fn strings(&self) -> &'static TemplateStrings {
        match self {
            Locale::Fr => &FR,
            Locale::En => &EN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    /// The address supplied with an order. The only mail error a client can fix.
    #[error("invalid customer email address: {0}")]
    InvalidCustomerAddress(String),

    /// A sender or shop address from the mail settings.
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("mail transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// SMTP delivery. Port 465 uses implicit TLS, every other port STARTTLS.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let builder = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| MailError::Transport(e.to_string()))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(config.timeout))
            .build();

        Ok(Self { transport })
    }
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse::<Mailbox>()
        .map_err(|_| MailError::InvalidAddress(address.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(mailbox(&email.from)?)
            .to(mailbox(&email.to)?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.text.clone())
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport.send(message).await.map_err(|e| {
            tracing::error!(error = %e, to = %email.to, "SMTP send failed");
            MailError::Transport(e.to_string())
        })?;

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

fn items_list(items: &[OrderItem], strings: &TemplateStrings) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "• {} - {}: {} - {}: {}€",
                item.name, strings.quantity, item.qty, strings.price, item.price
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn order_subject(order: &Order, locale: Locale) -> String {
    format!("{} – REF {}", locale.strings().subject, order.reference)
}

pub fn render_customer_email(order: &Order, locale: Locale) -> String {
    let s = locale.strings();
    let c = &order.customer;
    format!(
        "{greeting} {name},\n\n{thanks}\n\n{order_reference}: {reference}\n\n{ordered_items}:\n{items}\n\n{total_amount}: {total} {currency}\n\n{shipping_address}:\n{name}\n{address}\n{zip} {city}\n{country}\n\n{phone_label}: {phone}\n\n{notice}\n\n{sign_off}\n{team}\n",
        greeting = s.greeting,
        name = c.name,
        thanks = s.thanks,
        order_reference = s.order_reference,
        reference = order.reference,
        ordered_items = s.ordered_items,
        items = items_list(&order.items, s),
        total_amount = s.total_amount,
        total = order.total,
        currency = order.currency,
        shipping_address = s.shipping_address,
        address = c.address,
        zip = c.zip,
        city = c.city,
        country = c.country,
        phone_label = s.phone,
        phone = c.phone.as_deref().unwrap_or(s.phone_missing),
        notice = s.processing_notice,
        sign_off = s.sign_off,
        team = s.team,
    )
}

pub fn render_shop_email(order: &Order, locale: Locale) -> String {
    let s = locale.strings();
    let c = &order.customer;
    format!(
        "{new_order}\n\n{reference_label}: {reference}\n\n{customer}:\n{name_label}: {name}\nEmail: {email}\n{phone_label}: {phone}\n\n{address_label}:\n{address}\n{zip} {city}\n{country}\n\n{items_label}:\n{items}\n\n{total_label}: {total} {currency}\n\n---\n{footer}\n",
        new_order = s.new_order,
        reference_label = s.reference,
        reference = order.reference,
        customer = s.customer,
        name_label = s.name,
        name = c.name,
        email = c.email,
        phone_label = s.phone,
        phone = c.phone.as_deref().unwrap_or(s.phone_missing),
        address_label = s.address,
        address = c.address,
        zip = c.zip,
        city = c.city,
        country = c.country,
        items_label = s.items,
        items = items_list(&order.items, s),
        total_label = s.total,
        total = order.total,
        currency = order.currency,
        footer = s.automated_footer,
    )
}

/// Sends the customer confirmation and the shop notification for an order.
#[derive(Clone)]
pub struct OrderNotifier {
    mailer: std::sync::Arc<dyn Mailer>,
    from: String,
    shop_email: String,
    locale: Locale,
}

impl OrderNotifier {
    /// Fails when the sender or shop address cannot be parsed, so a
    /// misconfigured mailbox is caught before any order is taken.
    pub fn new(
        mailer: std::sync::Arc<dyn Mailer>,
        from: impl Into<String>,
        shop_email: impl Into<String>,
        locale: Locale,
    ) -> Result<Self, MailError> {
        let from = from.into();
        let shop_email = shop_email.into();
        mailbox(&from)?;
        mailbox(&shop_email)?;

        Ok(Self {
            mailer,
            from,
            shop_email,
            locale,
        })
    }

    /// SMTP notifier sending as the mail account user.
    pub fn from_config(config: &MailConfig, locale: Locale) -> Result<Self, MailError> {
        mailbox(&config.username)?;
        mailbox(&config.shop_email)?;
        let mailer = SmtpMailer::new(config)?;
        Self::new(
            std::sync::Arc::new(mailer),
            config.username.clone(),
            config.shop_email.clone(),
            locale,
        )
    }

    /// Both emails for `order`, customer first.
    pub fn compose(&self, order: &Order) -> [OutgoingEmail; 2] {
        let subject = order_subject(order, self.locale);
        [
            OutgoingEmail {
                from: self.from.clone(),
                to: order.customer.email.clone(),
                subject: subject.clone(),
                text: render_customer_email(order, self.locale),
            },
            OutgoingEmail {
                from: self.from.clone(),
                to: self.shop_email.clone(),
                subject: format!("[LUXIO] {}", subject),
                text: render_shop_email(order, self.locale),
            },
        ]
    }

    /// Send both emails. The first failure aborts the operation; an email
    /// already delivered is not recalled.
    pub async fn notify(&self, order: &Order) -> Result<(), MailError> {
        // Reject a bad customer address before anything goes out
        order
            .customer
            .email
            .parse::<Address>()
            .map_err(|_| MailError::InvalidCustomerAddress(order.customer.email.clone()))?;

        for email in self.compose(order) {
            self.mailer.send(&email).await?;
        }

        tracing::info!(reference = %order.reference, "Order confirmation emails sent");
        Ok(())
    }
}
