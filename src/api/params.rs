use serde::Serialize;

/// Lookup property used to correlate events with a recording.
pub const SESSION_ID_PROPERTY: &str = "$session_id";
/// Events are always requested oldest first.
pub const EVENTS_ORDER_BY: &str = "timestamp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterLogic {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyOperator {
    Exact,
    IsNotSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Event,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Single(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyFilter {
    pub key: String,
    pub operator: PropertyOperator,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub value: PropertyValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyGroupValue {
    Group(PropertyGroup),
    Property(PropertyFilter),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyGroup {
    #[serde(rename = "type")]
    pub logic: FilterLogic,
    pub values: Vec<PropertyGroupValue>,
}

impl PropertyGroup {
    #[must_use]
    pub const fn new(logic: FilterLogic, values: Vec<PropertyGroupValue>) -> Self {
        Self { logic, values }
    }
}

/// Matches events of the recording's session plus legacy events that were
/// captured before `$session_id` existed.
#[must_use]
pub fn session_events_filter(session_id: &str) -> PropertyGroup {
    let legacy = PropertyFilter {
        key: SESSION_ID_PROPERTY.to_owned(),
        operator: PropertyOperator::IsNotSet,
        kind: PropertyKind::Event,
        value: PropertyValue::Single("is_not_set".to_owned()),
    };
    let same_session = PropertyFilter {
        key: SESSION_ID_PROPERTY.to_owned(),
        operator: PropertyOperator::Exact,
        kind: PropertyKind::Event,
        value: PropertyValue::Many(vec![session_id.to_owned()]),
    };
    PropertyGroup::new(
        FilterLogic::Or,
        vec![
            PropertyGroupValue::Group(PropertyGroup::new(
                FilterLogic::And,
                vec![PropertyGroupValue::Property(legacy)],
            )),
            PropertyGroupValue::Group(PropertyGroup::new(
                FilterLogic::And,
                vec![PropertyGroupValue::Property(same_session)],
            )),
        ],
    )
}

/// Parameters of the first events request for a recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventsApiParams {
    pub after: String,
    pub before: String,
    pub person_id: String,
    #[serde(rename = "orderBy")]
    pub order_by: Vec<String>,
    pub properties: PropertyGroup,
}

impl EventsApiParams {
    /// Query pairs for `GET .../events`.
    ///
    /// # Errors
    ///
    /// Returns an error when the property filter cannot be serialized.
    pub fn query_pairs(&self) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
        Ok(vec![
            ("after", self.after.clone()),
            ("before", self.before.clone()),
            ("person_id", self.person_id.clone()),
            ("order_by", self.order_by.join(",")),
            ("properties", serde_json::to_string(&self.properties)?),
        ])
    }
}

/// Parameters of the single performance-events request; same window and
/// person as the events request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceEventsParams {
    pub session_id: String,
    pub date_from: String,
    pub date_to: String,
    pub person_id: String,
}

impl PerformanceEventsParams {
    #[must_use]
    pub fn for_events(session_id: &str, events: &EventsApiParams) -> Self {
        Self {
            session_id: session_id.to_owned(),
            date_from: events.after.clone(),
            date_to: events.before.clone(),
            person_id: events.person_id.clone(),
        }
    }

    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("session_id", self.session_id.clone()),
            ("date_from", self.date_from.clone()),
            ("date_to", self.date_to.clone()),
            ("person_id", self.person_id.clone()),
        ]
    }
}
