pub mod booking;
pub mod common;
pub mod discount;
pub mod event;
pub mod file;
pub mod invitation;
pub mod organization;
pub mod ticket;

pub use booking::{Booking, BookingDecision, BookingStatus, Guest};
pub use common::{Displayable, Identifiable, NamedEntity, Role};
pub use discount::{CategoryDiscount, PredefinedCategory};
pub use event::{Event, EventStatus, VenueRef};
pub use file::FileRef;
pub use invitation::{CheckOutcome, CodeType, InvitationDetails, InvitationStatus};
pub use organization::Organization;
pub use ticket::{TicketStatus, TicketType};
