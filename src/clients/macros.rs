/// Generates the plain lookups every domain client exposes.
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $entity_name_snake:ident) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](&self, id: String) -> $crate::error::EngineResult<Option<$entity>> {
                    tracing::debug!("Sending request");
                    self.inner.get(id).await
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<list_ $entity_name_snake s>](&self) -> $crate::error::EngineResult<Vec<$entity>> {
                    tracing::debug!("Sending request");
                    self.inner.find(|_| true).await
                }
            }
        }
    };
}

/// Fails with `Unauthorized` unless the session is an admin.
macro_rules! require_admin {
    ($session:expr, $what:expr) => {
        if !$session.is_admin() {
            tracing::warn!(user_id = %$session.user_id, "Admin operation refused");
            return Err($crate::error::EngineError::Unauthorized(format!(
                "{} requires an admin session",
                $what
            )));
        }
    };
}
