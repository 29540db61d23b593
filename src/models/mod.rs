pub mod dispatch;
pub mod need;
pub mod organization;
pub mod resource;
pub mod stock;
pub mod user;

// Re-export only the types we actually use
pub use dispatch::{CreateDispatch, Dispatch};
pub use need::{CreateNeed, Location, Need, NeedResponse, NeedType, Urgency};
pub use organization::{CreateOrganization, Member, Organization, UpdateOrganization};
pub use resource::{CreateResource, Resource, ResourceStatus};
pub use stock::{Stock, StockChange};
pub use user::{Role, User, UserResponse};
