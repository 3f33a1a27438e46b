use async_graphql::{Context, Object, Result};
use chrono::Utc;
use tracing::debug;

use crate::database::{Database, Interaction, InteractionKind, InteractionSource};

const UNKNOWN_DEVICE: &str = "unknown";

#[derive(Default)]
pub(super) struct InteractionMutation;

#[Object]
impl InteractionMutation {
    /// Records a visitor view or contact click.
    async fn track_interaction(
        &self,
        ctx: &Context<'_>,
        kind: InteractionKind,
        source: InteractionSource,
        device_type: Option<String>,
    ) -> Result<bool> {
        let db = ctx.data::<Database>()?;
        let interaction = Interaction {
            kind,
            source,
            device_type: device_type
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| UNKNOWN_DEVICE.to_string()),
            created_at: Utc::now(),
        };
        db.insert_interaction(&interaction)?;
        debug!(?kind, ?source, "Interaction tracked");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::{api::TestSchema, database::InteractionKind};

    #[tokio::test]
    async fn track_interaction_stores_event() {
        let schema = TestSchema::new();
        let query = r"
        mutation {
            trackInteraction(kind: PHONE, source: PROPERTY_DETAILS)
        }";
        let res = schema.execute(query).await;
        assert_eq!(res.data.to_string(), "{trackInteraction: true}");

        let stored: Vec<_> = schema
            .db
            .interactions()
            .collect::<anyhow::Result<_>>()
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].kind, InteractionKind::Phone);
        assert_eq!(stored[0].device_type, "unknown");
    }
}
