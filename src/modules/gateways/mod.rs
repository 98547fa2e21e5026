pub mod services;

pub use services::{
    CallbackStatus, ChargeRequest, ChargeSession, GatewayCallback, HostedCheckoutGateway,
    PaymentGateway,
};
