//! # API Route Modules
//!
//! | Module            | Prefix                      | Auth  |
//! |-------------------|-----------------------------|-------|
//! | [`entries`]       | `/v1/entries`               | none  |
//! | [`campaigns`]     | `/v1/campaigns`             | none  |
//! | [`referrals`]     | `/v1/referrals`             | none  |
//! | [`admin`]         | `/v1/admin/entries`, `/v1/admin/export`, `/v1/admin/integrations` | admin |
//! | [`notifications`] | `/v1/admin/notifications`   | admin |

pub mod admin;
pub mod campaigns;
pub mod entries;
pub mod notifications;
pub mod referrals;
