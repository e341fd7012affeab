//! Typed builders for the dating-demo tracking plan.
//!
//! Each struct names the fields of one schema and derives `Serialize`; the
//! payload tree is produced by [`to_value`](crate::ser::to_value), so field
//! order in the encoded JSON is declaration order and `None` fields are left
//! out.
//!
//! # Example
//! ```
//! use payload_core::events::{AccountType, ButtonClick, EventSpec, User};
//!
//! let click = ButtonClick {
//!     button_id: "checkout".into(),
//!     button_text: Some("Buy Now".into()),
//!     screen_name: "cart".into(),
//! };
//! let user = User::new("demo-user", AccountType::Free);
//! let event = click.to_spec_event(&user).unwrap();
//! assert_eq!(event.entities.len(), 2);
//! ```

use serde::Serialize;

use crate::envelope::{SelfDescribingEvent, SelfDescribingJson};
use crate::error::Result;

/// Data product every event specification below belongs to.
pub const DATA_PRODUCT_ID: &str = "cc74c64e-b8ba-4532-b3f7-0668fbf03186";
pub const DATA_PRODUCT_NAME: &str = "Dating App Demo";

/// A payload with a fixed schema.
pub trait SelfDescribing: Serialize {
    const SCHEMA: &'static str;

    /// Envelope for attaching this payload to another event.
    fn to_entity(&self) -> Result<SelfDescribingJson> {
        SelfDescribingJson::from_serializable(Self::SCHEMA, self)
    }

    /// Standalone event with no entities.
    fn to_event(&self) -> Result<SelfDescribingEvent> {
        Ok(SelfDescribingEvent::new(self.to_entity()?))
    }
}

/// An event that belongs to an event specification in the tracking plan.
pub trait EventSpec: SelfDescribing {
    const SPEC_ID: &'static str;
    const SPEC_NAME: &'static str;

    /// The event with the user entity and its event-specification entity
    /// attached, in that order.
    fn to_spec_event(&self, user: &User) -> Result<SelfDescribingEvent> {
        let spec = EventSpecification {
            id: Self::SPEC_ID.to_string(),
            name: Self::SPEC_NAME.to_string(),
            data_product_id: DATA_PRODUCT_ID.to_string(),
            data_product_name: DATA_PRODUCT_NAME.to_string(),
            data_product_domain: None,
        };
        Ok(self
            .to_event()?
            .with_entity(user.to_entity()?)
            .with_entity(spec.to_entity()?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TabName {
    Discover,
    Matches,
    Profile,
}

impl TabName {
    /// Parse the wire name (`"discover"`, `"matches"`, `"profile"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "discover" => Some(TabName::Discover),
            "matches" => Some(TabName::Matches),
            "profile" => Some(TabName::Profile),
            _ => None,
        }
    }
}

/// User subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Free,
    Premium,
    PremiumPlus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    Left,
    Right,
    SuperLike,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonClick {
    pub button_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    pub screen_name: String,
}

impl SelfDescribing for ButtonClick {
    const SCHEMA: &'static str = "iglu:com.dating-demo/dating-demo-button-click/jsonschema/1-0-0";
}

impl EventSpec for ButtonClick {
    const SPEC_ID: &'static str = "8ee91739-efe7-4bcd-91c9-ae734677aa32";
    const SPEC_NAME: &'static str = "Button click";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSwipe {
    pub profile_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_name: Option<String>,
    pub swipe_direction: SwipeDirection,
}

impl SelfDescribing for ProfileSwipe {
    const SCHEMA: &'static str = "iglu:com.dating-demo/dating-demo-profile-swipe/jsonschema/1-0-0";
}

impl EventSpec for ProfileSwipe {
    const SPEC_ID: &'static str = "9b0f84cc-fd66-4029-b436-579d6058782b";
    const SPEC_NAME: &'static str = "Profile swipe";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    pub profile_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
}

impl SelfDescribing for ProfileView {
    const SCHEMA: &'static str = "iglu:com.dating-demo/dating-demo-profile-view/jsonschema/1-0-0";
}

impl EventSpec for ProfileView {
    const SPEC_ID: &'static str = "72baf962-801a-4fe7-8e55-313732659574";
    const SPEC_NAME: &'static str = "Profile view";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabSwitch {
    pub tab_name: TabName,
}

impl SelfDescribing for TabSwitch {
    const SCHEMA: &'static str = "iglu:com.dating-demo/dating-demo-tab-switch/jsonschema/1-0-0";
}

impl EventSpec for TabSwitch {
    const SPEC_ID: &'static str = "206fb327-338c-441c-805a-567fb8f252d8";
    const SPEC_NAME: &'static str = "Tab switch";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub matched_profile_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_profile_name: Option<String>,
}

impl SelfDescribing for Match {
    const SCHEMA: &'static str = "iglu:com.dating-demo/dating-demo-match/jsonschema/1-0-0";
}

impl EventSpec for Match {
    const SPEC_ID: &'static str = "497bf4c2-3179-48ac-83cf-bc7bd12a4639";
    const SPEC_NAME: &'static str = "Match";
}

/// User context entity attached to every event specification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub account_type: AccountType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_since_registration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_completion_pct: Option<i64>,
    pub user_id: String,
}

impl User {
    pub fn new(user_id: impl Into<String>, account_type: AccountType) -> Self {
        User {
            account_type,
            days_since_registration: None,
            is_verified: None,
            profile_completion_pct: None,
            user_id: user_id.into(),
        }
    }
}

impl SelfDescribing for User {
    const SCHEMA: &'static str = "iglu:com.dating-demo/dating-demo-user/jsonschema/1-0-0";
}

/// Entity referencing the event specification an event adheres to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSpecification {
    pub id: String,
    pub name: String,
    pub data_product_id: String,
    pub data_product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_product_domain: Option<String>,
}

impl SelfDescribing for EventSpecification {
    const SCHEMA: &'static str =
        "iglu:com.snowplowanalytics.snowplow/event_specification/jsonschema/1-0-3";
}
