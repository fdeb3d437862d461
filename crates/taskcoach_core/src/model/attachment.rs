//! Attachments: named items pointing at a file, URI or mail message.

use crate::event::{Event, EventValue};
use crate::model::item::{Item, ItemKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentType {
    #[default]
    File,
    Uri,
    Mail,
}

/// Attachment-specific fields of `ItemData`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AttachmentFields {
    pub(crate) location: String,
    pub(crate) kind: AttachmentType,
}

impl Item {
    /// New attachment whose subject defaults to its location.
    pub fn new_attachment(location: impl Into<String>, kind: AttachmentType) -> Item {
        let location = location.into();
        Item::builder(ItemKind::Attachment)
            .subject(location.clone())
            .location(location)
            .attachment_type(kind)
            .build()
    }

    pub fn location(&self) -> String {
        self.data().attachment.location.clone()
    }

    pub fn attachment_type(&self) -> AttachmentType {
        self.data().attachment.kind
    }

    pub fn set_location(&self, location: impl Into<String>) -> bool {
        Event::batch(|event| self.set_location_in(location, event))
    }

    pub fn set_location_in(&self, location: impl Into<String>, event: &mut Event) -> bool {
        let location = location.into();
        if !self.replace_field(|data| &mut data.attachment.location, location.clone()) {
            return false;
        }
        event.add_source(
            self.kind().location_changed_event_type(),
            self,
            [EventValue::Text(location)],
        );
        true
    }
}
