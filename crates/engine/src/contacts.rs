//! Messages submitted through the public contact form.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "contact_messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ContactMessage> for ActiveModel {
    fn from(contact: &ContactMessage) -> Self {
        Self {
            id: ActiveValue::Set(contact.id.to_string()),
            name: ActiveValue::Set(contact.name.clone()),
            email: ActiveValue::Set(contact.email.clone()),
            message: ActiveValue::Set(contact.message.clone()),
            created_at: ActiveValue::Set(contact.created_at),
        }
    }
}

impl TryFrom<Model> for ContactMessage {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "contact message")?,
            name: model.name,
            email: model.email,
            message: model.message,
            created_at: model.created_at,
        })
    }
}
