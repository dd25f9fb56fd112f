/// Turns upstream payloads and manifest definitions into a domain record.
///
/// A builder yields either a complete record or nothing; a partially
/// populated record never escapes.
#[async_trait::async_trait]
pub trait EntityBuilder {
    type Output: Send;

    async fn build(&self) -> Option<Self::Output>;
}
