pub mod payments;
pub mod stripe;

pub use payments::create_authorized_payment;
pub use stripe::StripeClient;
