//! The mapping engine: an event-driven state machine over quick-xml
//! events.
//!
//! The mapper keeps one context frame per open element. A frame either
//! carries a target object under construction (when the tag resolved to a
//! class) or is a plain leaf accumulating character data. Closing an
//! element pops its frame and assigns the resulting value — the object
//! itself, or the accumulated text — to the parent frame's resolved
//! property, running the hook pipeline at every decision point. Closing a
//! root element appends its object to the result collection.
//!
//! One mapper maps exactly one document; `parse` consumes it.

use std::io::BufRead;

use chrono::{NaiveDate, NaiveDateTime};
use heck::ToSnakeCase;
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use tracing::{debug, trace};

use crate::error::{MapError, Result};
use crate::object::MappedObject;
use crate::registry::ClassRegistry;
use crate::value::{Property, Value};

/// Maps a whole XML document in one call.
pub fn map_str(xml: &str, registry: ClassRegistry) -> Result<Vec<Box<dyn MappedObject>>> {
    XmlMapper::from_str(xml, registry).parse()
}

/// One frame of the mapper's working memory: the record of one open
/// element.
struct MappingContext {
    /// The element's tag name.
    element: String,
    /// The property on the parent's target this subtree feeds.
    property: String,
    /// The object under construction; `None` for a leaf frame.
    target: Option<Box<dyn MappedObject>>,
    /// Accumulated character data, verbatim.
    text: String,
}

/// The event-driven XML to object mapper.
pub struct XmlMapper<R: BufRead> {
    reader: Reader<R>,
    registry: ClassRegistry,
    stack: Vec<MappingContext>,
    mapped: Vec<Box<dyn MappedObject>>,
    buf: Vec<u8>,
}

impl<'a> XmlMapper<&'a [u8]> {
    /// Creates a mapper over an in-memory document.
    pub fn from_str(xml: &'a str, registry: ClassRegistry) -> Self {
        Self::with_reader(Reader::from_str(xml), registry)
    }
}

impl<R: BufRead> XmlMapper<R> {
    /// Creates a mapper over a buffered byte stream.
    pub fn new(reader: R, registry: ClassRegistry) -> Self {
        Self::with_reader(Reader::from_reader(reader), registry)
    }

    fn with_reader(mut reader: Reader<R>, registry: ClassRegistry) -> Self {
        // Well-nestedness is part of the event contract; mismatched end
        // tags must fail the parse rather than pop the wrong frame.
        reader.config_mut().check_end_names = true;
        Self {
            reader,
            registry,
            stack: Vec::new(),
            mapped: Vec::new(),
            buf: Vec::new(),
        }
    }

    /// Drives the reader to completion and returns the mapped root
    /// objects in document order.
    ///
    /// Any fatal error discards all partially built objects; there is no
    /// partial result on failure.
    pub fn parse(mut self) -> Result<Vec<Box<dyn MappedObject>>> {
        loop {
            let event = self.next_event()?;
            match event {
                Event::Start(start) => {
                    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                    self.start_element(tag)?;
                }
                Event::Empty(start) => {
                    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                    self.start_element(tag)?;
                    self.end_element()?;
                }
                // References in text arrive as separate GeneralRef
                // events, so text content needs no unescaping here.
                Event::Text(text) => {
                    let raw = String::from_utf8_lossy(text.as_ref()).into_owned();
                    self.characters(&raw);
                }
                Event::CData(data) => {
                    let raw = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    self.characters(&raw);
                }
                Event::GeneralRef(general) => {
                    if let Some(ch) = general.resolve_char_ref()? {
                        let mut utf8 = [0u8; 4];
                        self.characters(ch.encode_utf8(&mut utf8));
                    } else {
                        let name = general.decode().map_err(quick_xml::Error::from)?;
                        match resolve_predefined_entity(&name) {
                            Some(text) => self.characters(text),
                            // Custom DTD entities have no expansion here;
                            // dropping the reference keeps the parse lenient.
                            None => debug!(reference = %name, "skipping unresolvable entity reference"),
                        }
                    }
                }
                Event::End(_) => {
                    self.end_element()?;
                }
                Event::Eof => {
                    if let Some(frame) = self.stack.last() {
                        return Err(MapError::UnexpectedEof {
                            element: frame.element.clone(),
                        });
                    }
                    break;
                }
                // Declarations, comments, PIs and doctype carry no
                // mapped data.
                _ => {}
            }
        }
        Ok(self.mapped)
    }

    fn next_event(&mut self) -> Result<Event<'static>> {
        self.buf.clear();
        let event = self.reader.read_event_into(&mut self.buf)?;
        Ok(event.into_owned())
    }

    /// Opens a frame for `tag`: resolves the owning property on the
    /// enclosing target, then the class to instantiate. No resolved class
    /// means a leaf frame — the subtree degrades to inert text.
    fn start_element(&mut self, tag: String) -> Result<()> {
        let parent = self.stack.last().and_then(|frame| frame.target.as_deref());
        let property = parent
            .and_then(|object| object.property_for_tag(&tag))
            .unwrap_or_else(|| default_property_name(&tag));
        let resolved = parent
            .and_then(|object| object.class_for_property(&property))
            .or_else(|| self.registry.class_for(&tag));

        let target = match resolved {
            Some(construct) => {
                let mut object = construct();
                trace!(tag = %tag, class = object.type_name(), "opening object frame");
                object
                    .will_be_mapped()
                    .map_err(|source| MapError::hook(&tag, &property, source))?;
                Some(object)
            }
            None => {
                trace!(tag = %tag, "no class resolved; element maps as text");
                None
            }
        };

        self.stack.push(MappingContext {
            element: tag,
            property,
            target,
            text: String::new(),
        });
        Ok(())
    }

    /// Appends character data to the innermost open frame. Data outside
    /// any element is ignored.
    fn characters(&mut self, data: &str) {
        if let Some(frame) = self.stack.last_mut() {
            frame.text.push_str(data);
        }
    }

    /// Closes the innermost frame and assigns its value to the parent,
    /// or to the result collection when the stack empties.
    fn end_element(&mut self) -> Result<()> {
        let Some(frame) = self.stack.pop() else {
            // The reader rejects unbalanced documents before this point.
            return Ok(());
        };

        let value = match frame.target {
            Some(mut object) => {
                // Element content of an object frame lands on the
                // object's own `text` property, if it declares one.
                if !frame.text.trim().is_empty() {
                    assign(object.as_mut(), &frame.element, "text", Value::Text(frame.text))?;
                }
                object
                    .did_map()
                    .map_err(|source| MapError::hook(&frame.element, &frame.property, source))?;
                Value::Object(object)
            }
            None => Value::Text(frame.text),
        };

        match self.stack.last_mut() {
            Some(enclosing) => match enclosing.target.as_deref_mut() {
                Some(parent) => assign(parent, &frame.element, &frame.property, value)?,
                None => {
                    trace!(element = %frame.element, "enclosing element is unmapped; value dropped");
                }
            },
            None => match value {
                Value::Object(object) => {
                    debug!(element = %frame.element, class = object.type_name(), "root object mapped");
                    self.mapped.push(object);
                }
                _ => {
                    trace!(element = %frame.element, "text-only root produced no object");
                }
            },
        }
        Ok(())
    }
}

/// The default tag-to-property transform: the conventional Rust property
/// identifier, so `product-code` and `productCode` both resolve to
/// `product_code`.
fn default_property_name(tag: &str) -> String {
    tag.to_snake_case()
}

/// Runs the assignment pipeline for a value arriving at `parent`'s
/// `property` from element `element`.
///
/// An empty slot takes the scalar path; an occupied slot is promoted to
/// an ordered sequence (the previous scalar becomes element 0) and takes
/// the addition path with its own hook triple. A property the parent
/// does not declare skips silently.
fn assign(
    parent: &mut dyn MappedObject,
    element: &str,
    property: &str,
    value: Value,
) -> Result<()> {
    if parent.property(property).is_none() {
        debug!(
            element = %element,
            property = %property,
            class = parent.type_name(),
            "target declares no such property; assignment skipped"
        );
        return Ok(());
    }

    let value = coerce(&*parent, property, value)?;
    let hook = |source| MapError::hook(element, property, source);

    match parent.property_mut(property).and_then(Property::take) {
        None => {
            if !parent.should_map_element(element, property, &value).map_err(hook)? {
                trace!(element = %element, property = %property, "scalar assignment vetoed");
                return Ok(());
            }
            parent.will_map_element(element, property, &value).map_err(hook)?;
            if let Some(value) = parent.map_element(element, property, value).map_err(hook)? {
                if let Some(slot) = parent.property_mut(property) {
                    slot.set(value);
                }
            }
            parent.did_map_element(element, property).map_err(hook)?;
        }
        Some(previous) => {
            let existing: &[Value] = match &previous {
                Value::List(items) => items,
                single => std::slice::from_ref(single),
            };
            if !parent
                .should_add_element(element, property, &value, existing)
                .map_err(hook)?
            {
                trace!(element = %element, property = %property, "sequence addition vetoed");
                // A veto leaves the property exactly as it was.
                if let Some(slot) = parent.property_mut(property) {
                    slot.set(previous);
                }
                return Ok(());
            }
            parent
                .will_add_element(element, property, &value, existing)
                .map_err(hook)?;

            let mut items = match previous {
                Value::List(items) => items,
                single => vec![single],
            };
            if let Some(value) = parent
                .add_element(element, property, value, &items)
                .map_err(hook)?
            {
                items.push(value);
            }
            if let Some(slot) = parent.property_mut(property) {
                slot.set(Value::List(items));
            }
            parent.did_add_element(element, property).map_err(hook)?;
        }
    }
    Ok(())
}

/// Coerces leaf text toward the property's declared type. Only the date
/// hooks introduce a non-text scalar; everything else passes through.
fn coerce(parent: &dyn MappedObject, property: &str, value: Value) -> Result<Value> {
    let Value::Text(text) = value else {
        return Ok(value);
    };
    if let Some(date) = parent.date_for_property(property, &text) {
        return Ok(Value::Date(date));
    }
    match parent.date_format_for(property) {
        Some(format) => match parse_date(&text, format) {
            Some(date) => Ok(Value::Date(date)),
            None => Err(MapError::InvalidDate {
                property: property.to_string(),
                value: text,
                format: format.to_string(),
            }),
        },
        None => Ok(Value::Text(text)),
    }
}

/// Accepts date-time formats and plain date formats (at midnight).
fn parse_date(text: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, format).ok().or_else(|| {
        NaiveDate::parse_from_str(text, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    })
}
