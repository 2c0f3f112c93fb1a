//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
use std::str::FromStr;

use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use shikshya_payment_engine::{traits::SettlementDatabase, SettlementApi};
use wallet_gateways::{extract_data_param, EsewaGateway, GatewayError, KhaltiApi, Provider, VerifiedPayment};

use crate::{
    data_objects::{VerifyPaymentRequest, VerifyPaymentResult},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//------------------------------------------   Verify payment  -------------------------------------------------
route!(verify_payment => Post "/payments/verify" impl SettlementDatabase);
/// Route handler for the payment verification endpoint
///
/// The success page posts the provider redirect parameters here after the buyer returns from eSewa or Khalti.
/// The handler verifies the payment with the named provider, then settles it: the matching pending orders are
/// completed, enrollments granted and cart items cleared. The call is idempotent, so the page can safely
/// retry or be reloaded.
///
/// The authenticated user id arrives in the `X-User-Id` header, set by the reverse proxy. Requests without it
/// are rejected with 401 before anything else happens.
pub async fn verify_payment<B: SettlementDatabase>(
    req: HttpRequest,
    body: web::Json<VerifyPaymentRequest>,
    api: web::Data<SettlementApi<B>>,
    esewa: web::Data<EsewaGateway>,
    khalti: web::Data<KhaltiApi>,
) -> Result<HttpResponse, ServerError> {
    let user_id = user_id_from_headers(&req)?;
    let params = body.into_inner();
    let provider = detect_provider(&params)?;
    trace!("💻️ Verifying {provider} payment for user [{user_id}]");
    let payment = verify_with_provider(provider, &params, esewa.as_ref(), khalti.as_ref()).await?;
    debug!(
        "💻️ {} payment [{}] verified for user [{user_id}]. Settling.",
        payment.provider, payment.provider_reference
    );
    let outcome = api.resolve_and_settle(&user_id, &payment).await?;
    info!(
        "💻️ Payment [{}] settled for user [{user_id}]: {} course(s)",
        payment.provider_reference,
        outcome.course_ids.len()
    );
    Ok(HttpResponse::Ok().json(VerifyPaymentResult::from(outcome)))
}

async fn verify_with_provider(
    provider: Provider,
    params: &VerifyPaymentRequest,
    esewa: &EsewaGateway,
    khalti: &KhaltiApi,
) -> Result<VerifiedPayment, ServerError> {
    let payment = match provider {
        Provider::Esewa => {
            let data = extract_data_param(params.data.as_deref(), Some(params.method.as_str())).ok_or_else(|| {
                ServerError::CouldNotDeserializePayload("The eSewa redirect carried no data parameter".to_string())
            })?;
            let callback = esewa.decode_callback(&data)?;
            esewa.verify(&callback)?
        },
        Provider::Khalti => {
            khalti
                .verify(params.pidx.as_deref(), params.purchase_order_id.as_deref(), params.recovery.as_ref())
                .await?
        },
    };
    Ok(payment)
}

/// Work out which provider this redirect came from.
///
/// The `method` parameter sometimes arrives with an eSewa payload fused onto it, so only the part before any
/// `?` counts. If the method is unrecognisable, the client's recovered session state gets the final say.
fn detect_provider(params: &VerifyPaymentRequest) -> Result<Provider, ServerError> {
    let method = params.method.split('?').next().unwrap_or_default();
    if let Ok(provider) = Provider::from_str(method) {
        return Ok(provider);
    }
    if let Some(provider) = params.recovery.as_ref().and_then(|r| r.method) {
        debug!("💻️ Payment method [{}] not recognised. Recovered [{provider}] from client state.", params.method);
        return Ok(provider);
    }
    Err(GatewayError::PaymentMethodNotDetected.into())
}

fn user_id_from_headers(req: &HttpRequest) -> Result<String, ServerError> {
    req.headers()
        .get("X-User-Id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or(ServerError::UnidentifiedUser)
}
