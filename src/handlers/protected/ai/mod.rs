// handlers/protected/ai/mod.rs - AI agent and recommendation review handlers
//
// Each agent endpoint performs exactly one generation call. A failed call
// stores nothing and audits nothing; the caller gets 502.

pub mod agents; // POST /api/ai/{narrative-architect,content-synthesizer,distribution-optimizer,feedback-intelligence}
pub mod list;   // GET/POST /api/ai/recommendations
pub mod review; // PUT /api/ai/recommendations/:id/{approve,reject,review}
pub mod show;   // GET /api/ai/recommendations/:id

pub use agents::{
    content_synthesizer_post, distribution_optimizer_post, feedback_intelligence_post,
    narrative_architect_post, recommendation_create,
};
pub use list::recommendation_list;
pub use review::{recommendation_approve, recommendation_reject, recommendation_review};
pub use show::recommendation_show;
