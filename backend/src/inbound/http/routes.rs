//! Route table.
//!
//! Every marketplace route is wrapped in an [`AccessGate`] built from the
//! [`RoutePolicy`], so changing who may call an operation is configuration
//! rather than handler code.
//!
//! | Method | Path                    | Operation        |
//! |--------|-------------------------|------------------|
//! | POST   | `/jwt`                  | `issue_session`  |
//! | GET    | `/logout`               | (always public)  |
//! | POST   | `/users/{email}`        | `ensure_user`    |
//! | PATCH  | `/users/{email}`        | `request_upgrade`|
//! | GET    | `/users/role/{email}`   | `read_role`      |
//! | GET    | `/users`                | `list_users`     |
//! | PUT    | `/users/{userId}/role`  | `set_role`       |
//! | PUT    | `/users/{userId}/fraud` | `flag_fraud`     |
//! | DELETE | `/users/{userId}`       | `remove_user`    |
//! | POST   | `/offers`               | `submit_offer`   |
//! | GET    | `/offers`, `/offers/{id}` | `read_offers`  |
//! | PATCH  | `/offers/{id}/accept`   | `decide_offer`   |
//! | PATCH  | `/offers/{id}/reject`   | `decide_offer`   |

use actix_web::web;

use crate::domain::{Operation, RoutePolicy};

use super::access_gate::AccessGate;
use super::{auth, offers, users};

/// Mount the marketplace routes under the current scope.
pub fn configure(cfg: &mut web::ServiceConfig, policy: &RoutePolicy) {
    let gate = |operation| AccessGate::for_operation(policy, operation);

    cfg.service(
        web::resource("/jwt")
            .route(web::post().to(auth::issue_session).wrap(gate(Operation::IssueSession))),
    )
    .service(web::resource("/logout").route(web::get().to(auth::logout)))
    .service(
        web::resource("/users")
            .route(web::get().to(users::list_users).wrap(gate(Operation::ListUsers))),
    )
    .service(
        web::resource("/users/role/{email}")
            .route(web::get().to(users::get_role).wrap(gate(Operation::ReadRole))),
    )
    .service(
        web::resource("/users/{user_id}/role")
            .route(web::put().to(users::set_role).wrap(gate(Operation::SetRole))),
    )
    .service(
        web::resource("/users/{user_id}/fraud")
            .route(web::put().to(users::flag_fraud).wrap(gate(Operation::FlagFraud))),
    )
    .service(
        // `{key}` is an email for POST/PATCH and a user id for DELETE.
        web::resource("/users/{key}")
            .route(web::post().to(users::ensure_user).wrap(gate(Operation::EnsureUser)))
            .route(
                web::patch()
                    .to(users::request_upgrade)
                    .wrap(gate(Operation::RequestUpgrade)),
            )
            .route(web::delete().to(users::remove_user).wrap(gate(Operation::RemoveUser))),
    )
    .service(
        web::resource("/offers")
            .route(web::post().to(offers::submit_offer).wrap(gate(Operation::SubmitOffer)))
            .route(web::get().to(offers::list_offers).wrap(gate(Operation::ReadOffers))),
    )
    .service(
        web::resource("/offers/{id}")
            .route(web::get().to(offers::get_offer).wrap(gate(Operation::ReadOffers))),
    )
    .service(
        web::resource("/offers/{id}/accept")
            .route(web::patch().to(offers::accept_offer).wrap(gate(Operation::DecideOffer))),
    )
    .service(
        web::resource("/offers/{id}/reject")
            .route(web::patch().to(offers::reject_offer).wrap(gate(Operation::DecideOffer))),
    );
}
