pub mod gateway_trait;
pub mod hosted_checkout;

pub use gateway_trait::{
    CallbackStatus, ChargeRequest, ChargeSession, GatewayCallback, PaymentGateway,
};
pub use hosted_checkout::HostedCheckoutGateway;
