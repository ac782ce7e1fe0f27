//! # elemap
//!
//! Event-driven XML to object mapping: streams quick-xml events into a
//! graph of typed objects without the target model declaring mapping
//! metadata up front.
//!
//! The engine consumes start/text/end events, keeps one context frame
//! per open element, resolves the class to instantiate for each tag
//! through a [`ClassRegistry`] (or a per-type hook), resolves the
//! property each element feeds on its parent, coerces textual values
//! (dates via the date hooks, nested objects, repeated-element
//! sequences), and consults the optional [`MappedObject`] hooks at every
//! decision point.
//!
//! ## Leniency
//!
//! Unknown tags degrade to inert text and unknown properties skip
//! assignment silently — evolving schemas map best-effort. Only
//! malformed XML and failing hooks abort a parse, and a failed parse
//! never yields partial results.
//!
//! ## Sequences
//!
//! A property that receives a second value from a repeated sibling
//! element is transparently promoted to an ordered sequence: the first
//! value becomes element 0, the new one appends. Nothing has to be
//! pre-declared as repeatable.
//!
//! ## Example
//!
//! ```
//! use elemap::{ClassRegistry, MappedObject, Properties, Property, map_str};
//!
//! #[derive(Default, Properties)]
//! struct Order {
//!     item: Property,
//! }
//! impl MappedObject for Order {}
//!
//! #[derive(Default, Properties)]
//! struct Item {
//!     text: Property,
//! }
//! impl MappedObject for Item {}
//!
//! # fn main() -> elemap::Result<()> {
//! let registry = ClassRegistry::new().with::<Order>("order").with::<Item>("item");
//! let objects = map_str("<order><item>A</item><item>B</item></order>", registry)?;
//!
//! let order = objects[0].downcast_ref::<Order>().unwrap();
//! let texts: Vec<_> = order.item.objects::<Item>().filter_map(|i| i.text.text()).collect();
//! assert_eq!(texts, ["A", "B"]);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod mapper;
pub mod object;
pub mod registry;
pub mod value;

pub use elemap_macro::Properties;

pub use error::{HookError, HookResult, MapError, Result};
pub use mapper::{XmlMapper, map_str};
pub use object::{MappedObject, ObjectFactory, Properties, factory};
pub use registry::ClassRegistry;
pub use value::{Property, Value};
