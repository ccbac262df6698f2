//! Transient success/error notices shown at the top of a form.

use std::time::Duration;

/// Identifies one banner within its form. Ids only grow, so a stale id
/// never matches a newer banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BannerId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

impl BannerKind {
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Success => "form-success",
            Self::Error => "form-error-message",
        }
    }

    /// How long a banner of this kind stays up. Error banners persist
    /// until superseded.
    pub fn auto_dismiss(self, success_delay: Duration) -> Option<Duration> {
        match self {
            Self::Success => Some(success_delay),
            Self::Error => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub id: BannerId,
    pub kind: BannerKind,
    pub message: String,
}
