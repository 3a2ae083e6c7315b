//! Rate quote response parsing.
//!
//! Expected shape once SOAP prefixes are gone:
//!
//! ```xml
//! <GetRateQuoteResponse xmlns="http://www.rlcarriers.com/">
//!   <GetRateQuoteResult>
//!     <WasSuccess>true</WasSuccess>
//!     <Messages><string>...</string></Messages>
//!     <Result>
//!       <ServiceLevels>
//!         <ServiceLevel>
//!           <Title>Standard Service</Title>
//!           <Code>STD</Code>
//!           <NetCharge>$1,234.56</NetCharge>
//!           <ServiceDays>3</ServiceDays>
//!         </ServiceLevel>
//!       </ServiceLevels>
//!     </Result>
//!   </GetRateQuoteResult>
//! </GetRateQuoteResponse>
//! ```
//!
//! Elements are matched by local name, so namespace prefixes and unknown
//! siblings are tolerated.

use std::str::FromStr;

use chrono::{Duration, Local, NaiveDate};
use freightrate_core::{
    DeliveryRange, Location, Package, PortError, RateEstimate, RateOptions, RateResponse,
};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::CARRIER_NAME;
use crate::boolean::parse_bool_literal;

const CURRENCY: &str = "USD";
const MESSAGE_SEPARATOR: &str = ", ";

/// Errors raised while walking the response document.
#[derive(Debug, thiserror::Error)]
enum XmlError {
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),

    #[error("missing required XML element: {0}")]
    MissingElement(&'static str),

    #[error("unexpected end of document in {0}")]
    UnexpectedEof(&'static str),

    #[error("unexpected content after {0}")]
    TrailingContent(&'static str),

    #[error("failed to decode text: {0}")]
    Decode(String),
}

impl From<XmlError> for PortError {
    fn from(err: XmlError) -> Self {
        PortError::MalformedResponse(err.to_string())
    }
}

#[derive(Debug, Default)]
struct RateQuoteResult {
    was_success: Option<String>,
    messages: Vec<String>,
    service_levels: Vec<ServiceLevel>,
}

#[derive(Debug, Default)]
struct ServiceLevel {
    title: String,
    code: String,
    net_charge: Option<String>,
    service_days: Option<String>,
}

/// Parse a rate quote response, dating deliveries from today.
///
/// # Errors
///
/// See [`parse_response_on`].
pub fn parse_response(
    origin: &Location,
    destination: &Location,
    packages: &[Package],
    body: &str,
    options: &RateOptions,
) -> Result<RateResponse, PortError> {
    let today = Local::now().date_naive();
    parse_response_on(origin, destination, packages, body, options, today)
}

/// Parse a rate quote response, dating deliveries from `today`.
///
/// Every `ServiceLevel` becomes one [`RateEstimate`] in document order. The
/// delivery window opens and closes `ServiceDays` after `today`.
///
/// # Errors
///
/// Returns [`PortError::MalformedResponse`] when the body is not well-formed
/// or lacks the `GetRateQuoteResult` node, and [`PortError::InvalidBoolean`]
/// when `WasSuccess` holds an unrecognized literal.
pub fn parse_response_on(
    origin: &Location,
    destination: &Location,
    packages: &[Package],
    body: &str,
    options: &RateOptions,
    today: NaiveDate,
) -> Result<RateResponse, PortError> {
    if options.logs_xml() {
        debug!(xml = body, "rate quote response");
    }

    let result = read_rate_quote_result(body)?;

    let success = parse_bool_literal(result.was_success.as_deref().unwrap_or_default())?;

    // These are API diagnostics for the integrator, not text for end users.
    let message = result
        .messages
        .iter()
        .map(|message| message.trim())
        .filter(|message| !message.is_empty())
        .collect::<Vec<_>>()
        .join(MESSAGE_SEPARATOR);

    let rates = result
        .service_levels
        .into_iter()
        .map(|level| {
            let total_price = level
                .net_charge
                .as_deref()
                .and_then(parse_net_charge)
                .unwrap_or_else(|| {
                    warn!(
                        code = %level.code,
                        net_charge = ?level.net_charge,
                        "unreadable net charge, quoting zero"
                    );
                    Decimal::ZERO
                });
            let days = level.service_days.as_deref().map_or(0, parse_service_days);

            RateEstimate {
                origin: origin.clone(),
                destination: destination.clone(),
                carrier: CARRIER_NAME.to_owned(),
                service_name: level.title,
                service_code: level.code,
                total_price,
                currency: CURRENCY.to_owned(),
                packages: packages.to_vec(),
                delivery_range: DeliveryRange::on(delivery_date(today, days)),
            }
        })
        .collect();

    Ok(RateResponse::new(success, message, rates, body.to_owned()).with_log_xml(options.logs_xml()))
}

/// Read a currency-formatted charge such as `"$1,234.56"` as a dollar amount.
#[must_use]
pub fn parse_net_charge(raw: &str) -> Option<Decimal> {
    let amount: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|ch| *ch != ',')
        .collect();
    Decimal::from_str(amount.trim()).ok()
}

/// Read the leading integer of a day count, or 0 when there is none.
#[must_use]
pub fn parse_service_days(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(digits.len());

    digits
        .get(..end)
        .and_then(|number| number.parse::<i64>().ok())
        .map_or(0, |days| sign * days)
}

fn delivery_date(today: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| today.checked_add_signed(delta))
        .unwrap_or(today)
}

// ---------------------------------------------------------------------------
// Document walking
// ---------------------------------------------------------------------------

fn read_rate_quote_result(body: &str) -> Result<RateQuoteResult, XmlError> {
    let mut reader = Reader::from_str(body);
    let mut wrappers: u32 = 0;

    loop {
        match reader.read_event()? {
            Event::Start(tag) => match local_name(&tag)?.as_str() {
                "GetRateQuoteResponse" => {
                    let result = read_response_node(&mut reader)?;
                    close_wrappers(&mut reader, wrappers)?;
                    return Ok(result);
                }
                // Tolerate bodies that still carry the SOAP wrapper.
                "Envelope" | "Body" => wrappers += 1,
                _ => return Err(XmlError::MissingElement("GetRateQuoteResponse")),
            },
            Event::Empty(_) | Event::Eof => {
                return Err(XmlError::MissingElement("GetRateQuoteResponse"));
            }
            _ => {}
        }
    }
}

/// Consume the rest of the document: the end tags of `wrappers` open
/// elements, then nothing but whitespace, comments and processing
/// instructions.
fn close_wrappers(reader: &mut Reader<&[u8]>, mut wrappers: u32) -> Result<(), XmlError> {
    const CONTEXT: &str = "GetRateQuoteResponse";
    loop {
        match reader.read_event()? {
            Event::End(_) if wrappers > 0 => wrappers -= 1,
            Event::Text(text) if text.iter().all(u8::is_ascii_whitespace) => {}
            Event::Comment(_) | Event::PI(_) => {}
            Event::Eof if wrappers == 0 => return Ok(()),
            Event::Eof => return Err(XmlError::UnexpectedEof("SOAP envelope")),
            _ => return Err(XmlError::TrailingContent(CONTEXT)),
        }
    }
}

fn read_response_node(reader: &mut Reader<&[u8]>) -> Result<RateQuoteResult, XmlError> {
    let mut result = None;
    read_children(reader, "GetRateQuoteResponse", |child, name, empty| {
        if name != "GetRateQuoteResult" {
            return Ok(false);
        }
        result = Some(if empty {
            RateQuoteResult::default()
        } else {
            read_result_node(child)?
        });
        Ok(true)
    })?;

    result.ok_or(XmlError::MissingElement("GetRateQuoteResult"))
}

fn read_result_node(reader: &mut Reader<&[u8]>) -> Result<RateQuoteResult, XmlError> {
    let mut result = RateQuoteResult::default();
    read_children(reader, "GetRateQuoteResult", |child, name, empty| {
        match name {
            "WasSuccess" => result.was_success = Some(read_text(child, empty)?),
            "Messages" => result.messages = read_text_list(child, empty, "string")?,
            "Result" if !empty => {
                read_children(child, "Result", |details, inner, inner_empty| {
                    if inner != "ServiceLevels" || inner_empty {
                        return Ok(false);
                    }
                    result.service_levels = read_service_levels(details)?;
                    Ok(true)
                })?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    Ok(result)
}

fn read_service_levels(reader: &mut Reader<&[u8]>) -> Result<Vec<ServiceLevel>, XmlError> {
    let mut levels = Vec::new();
    read_children(reader, "ServiceLevels", |child, name, empty| {
        if name != "ServiceLevel" {
            return Ok(false);
        }
        levels.push(if empty {
            ServiceLevel::default()
        } else {
            read_service_level(child)?
        });
        Ok(true)
    })?;
    Ok(levels)
}

fn read_service_level(reader: &mut Reader<&[u8]>) -> Result<ServiceLevel, XmlError> {
    let mut level = ServiceLevel::default();
    read_children(reader, "ServiceLevel", |child, name, empty| {
        match name {
            "Title" => level.title = read_text(child, empty)?,
            "Code" => level.code = read_text(child, empty)?,
            "NetCharge" => level.net_charge = Some(read_text(child, empty)?),
            "ServiceDays" => level.service_days = Some(read_text(child, empty)?),
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    Ok(level)
}

/// Visit every child element until the parent's end tag.
///
/// `visit` receives the reader, the child's local name, and whether the child
/// is self-closing. It returns `false` for children it did not consume, which
/// are then skipped.
fn read_children<F>(
    reader: &mut Reader<&[u8]>,
    context: &'static str,
    mut visit: F,
) -> Result<(), XmlError>
where
    F: FnMut(&mut Reader<&[u8]>, &str, bool) -> Result<bool, XmlError>,
{
    loop {
        match reader.read_event()? {
            Event::Start(tag) => {
                let name = local_name(&tag)?;
                if !visit(reader, &name, false)? {
                    skip_element(reader, context)?;
                }
            }
            Event::Empty(tag) => {
                let name = local_name(&tag)?;
                visit(reader, &name, true)?;
            }
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(XmlError::UnexpectedEof(context)),
            _ => {}
        }
    }
}

fn read_text_list(
    reader: &mut Reader<&[u8]>,
    empty: bool,
    item_tag: &str,
) -> Result<Vec<String>, XmlError> {
    let mut items = Vec::new();
    if empty {
        return Ok(items);
    }
    read_children(reader, "list", |child, name, item_empty| {
        if name != item_tag {
            return Ok(false);
        }
        items.push(read_text(child, item_empty)?);
        Ok(true)
    })?;
    Ok(items)
}

fn read_text(reader: &mut Reader<&[u8]>, empty: bool) -> Result<String, XmlError> {
    if empty {
        Ok(String::new())
    } else {
        read_text_content(reader)
    }
}

/// Read the text content of the current element and consume its end tag.
fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(content) => {
                let decoded = content
                    .decode()
                    .map_err(|err| XmlError::Decode(err.to_string()))?;
                let unescaped = quick_xml::escape::unescape(&decoded)
                    .map_err(|err| XmlError::Decode(err.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::CData(content) => text.push_str(&String::from_utf8_lossy(&content)),
            Event::GeneralRef(reference) => {
                let resolved = reference
                    .resolve_char_ref()
                    .map_err(|err| XmlError::Decode(err.to_string()))?;
                if let Some(ch) = resolved {
                    text.push(ch);
                } else {
                    let name = reference
                        .decode()
                        .map_err(|err| XmlError::Decode(err.to_string()))?;
                    let entity = quick_xml::escape::resolve_predefined_entity(&name)
                        .ok_or_else(|| XmlError::Decode(format!("unknown entity &{name};")))?;
                    text.push_str(entity);
                }
            }
            Event::Start(_) => skip_element(reader, "text")?,
            Event::End(_) => return Ok(text.trim().to_owned()),
            Event::Eof => return Err(XmlError::UnexpectedEof("text content")),
            _ => {}
        }
    }
}

/// Skip over an element and all its children.
fn skip_element(reader: &mut Reader<&[u8]>, context: &'static str) -> Result<(), XmlError> {
    let mut depth: u32 = 1;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => return Err(XmlError::UnexpectedEof(context)),
            _ => {}
        }
    }
}

fn local_name(tag: &BytesStart<'_>) -> Result<String, XmlError> {
    std::str::from_utf8(tag.local_name().as_ref())
        .map(str::to_owned)
        .map_err(|err| XmlError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use freightrate_core::NO_RATES_MESSAGE;

    use super::*;

    const TWO_LEVELS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<GetRateQuoteResponse xmlns="http://www.rlcarriers.com/">
  <GetRateQuoteResult>
    <WasSuccess>true</WasSuccess>
    <Messages />
    <Result>
      <Origin><City>Wilmington</City></Origin>
      <ServiceLevels>
        <ServiceLevel>
          <Title>Standard</Title>
          <Code>STD</Code>
          <NetCharge>$100.00</NetCharge>
          <ServiceDays>3</ServiceDays>
        </ServiceLevel>
        <ServiceLevel>
          <Title>Expedited</Title>
          <Code>EXP</Code>
          <NetCharge>$250.00</NetCharge>
          <ServiceDays>1</ServiceDays>
        </ServiceLevel>
      </ServiceLevels>
    </Result>
  </GetRateQuoteResult>
</GetRateQuoteResponse>"#;

    const REJECTED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<GetRateQuoteResponse xmlns="http://www.rlcarriers.com/">
  <GetRateQuoteResult>
    <WasSuccess>false</WasSuccess>
    <Messages>
      <string>Origin Country must be USA or CAN</string>
      <string>Destination Country must be USA or CAN</string>
    </Messages>
  </GetRateQuoteResult>
</GetRateQuoteResponse>"#;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date")
    }

    fn parse(body: &str) -> Result<RateResponse, PortError> {
        let packages = [Package::new(150.0, [48.0, 40.0, 36.0])];
        parse_response_on(
            &Location::new("US"),
            &Location::new("US"),
            &packages,
            body,
            &RateOptions::default(),
            today(),
        )
    }

    fn with_was_success(literal: &str) -> String {
        TWO_LEVELS.replace("<WasSuccess>true</WasSuccess>", &format!("<WasSuccess>{literal}</WasSuccess>"))
    }

    #[test]
    fn test_should_parse_service_levels_in_order() {
        let response = parse(TWO_LEVELS).expect("parses");

        assert!(response.success, "carrier reported success");
        assert_eq!(response.message, "");
        assert_eq!(response.rates.len(), 2);

        let standard = response.rates.first().expect("first rate");
        assert_eq!(standard.service_name, "Standard");
        assert_eq!(standard.service_code, "STD");
        assert_eq!(standard.total_price, Decimal::new(100, 0));
        assert_eq!(standard.currency, "USD");
        assert_eq!(standard.carrier, "R+L Freight");
        assert_eq!(standard.packages.len(), 1);
        let in_three = NaiveDate::from_ymd_opt(2026, 3, 5).expect("valid date");
        assert_eq!(standard.delivery_range, DeliveryRange::on(in_three));

        let expedited = response.rates.get(1).expect("second rate");
        assert_eq!(expedited.service_code, "EXP");
        assert_eq!(expedited.total_price, Decimal::new(250, 0));
        let in_one = NaiveDate::from_ymd_opt(2026, 3, 3).expect("valid date");
        assert_eq!(expedited.delivery_range.earliest, in_one);
        assert_eq!(expedited.delivery_range.latest, in_one);
    }

    #[test]
    fn test_should_join_diagnostic_messages() {
        let response = parse(REJECTED).expect("parses");

        assert!(!response.success, "carrier reported failure");
        assert!(response.rates.is_empty());
        assert_eq!(
            response.message,
            "Origin Country must be USA or CAN, Destination Country must be USA or CAN"
        );
    }

    #[test]
    fn test_should_force_failure_without_service_levels() {
        let body = r#"<GetRateQuoteResponse><GetRateQuoteResult>
            <WasSuccess>true</WasSuccess>
            <Result><ServiceLevels /></Result>
        </GetRateQuoteResult></GetRateQuoteResponse>"#;

        let response = parse(body).expect("parses");

        assert!(!response.success, "no rates means no success");
        assert_eq!(response.message, NO_RATES_MESSAGE);
        assert_eq!(response.xml, body);
    }

    #[test]
    fn test_should_treat_missing_success_flag_as_false() {
        let body = TWO_LEVELS.replace("<WasSuccess>true</WasSuccess>", "");

        let response = parse(&body).expect("parses");

        assert!(!response.success, "absent flag is false");
        assert_eq!(response.rates.len(), 2);
    }

    #[test]
    fn test_should_convert_success_literals() {
        assert!(parse(&with_was_success("Yes")).expect("parses").success, "Yes");
        assert!(!parse(&with_was_success("0")).expect("parses").success, "0");
        assert!(!parse(&with_was_success("")).expect("parses").success, "blank");
    }

    #[test]
    fn test_should_fail_on_invalid_success_literal() {
        let err = parse(&with_was_success("maybe")).expect_err("invalid boolean");

        assert!(
            matches!(&err, PortError::InvalidBoolean(literal) if literal == "maybe"),
            "got {err:?}"
        );
    }

    #[test]
    fn test_should_fail_on_malformed_document() {
        let err = parse("<GetRateQuoteResponse><GetRateQuoteResult></Oops>").expect_err("malformed");
        assert!(matches!(err, PortError::MalformedResponse(_)), "got {err:?}");

        let err = parse("Service Unavailable").expect_err("not xml");
        assert!(matches!(err, PortError::MalformedResponse(_)), "got {err:?}");

        let err = parse("<GetRateQuoteResponse></GetRateQuoteResponse>").expect_err("no result");
        assert!(matches!(err, PortError::MalformedResponse(_)), "got {err:?}");
    }

    #[test]
    fn test_should_fail_on_content_after_response() {
        let mismatched = format!("{TWO_LEVELS}</Mismatch><unclosed>");
        let err = parse(&mismatched).expect_err("stray end tag");
        assert!(matches!(err, PortError::MalformedResponse(_)), "got {err:?}");

        let sibling = format!("{TWO_LEVELS}<Extra/>");
        let err = parse(&sibling).expect_err("second root");
        assert!(matches!(err, PortError::MalformedResponse(_)), "got {err:?}");

        let text = format!("{TWO_LEVELS}garbage");
        let err = parse(&text).expect_err("trailing text");
        assert!(matches!(err, PortError::MalformedResponse(_)), "got {err:?}");

        let padded = format!("{TWO_LEVELS}\n<!-- served by rate01 -->\n");
        assert_eq!(parse(&padded).expect("whitespace and comments").rates.len(), 2);
    }

    #[test]
    fn test_should_fail_on_unclosed_soap_wrapper() {
        let body = format!(
            "<soap:Envelope xmlns:soap=\"http://www.w3.org/2003/05/soap-envelope\"><soap:Body>{}",
            TWO_LEVELS.trim_start_matches(r#"<?xml version="1.0" encoding="utf-8"?>"#)
        );

        let err = parse(&body).expect_err("unclosed envelope");

        assert!(matches!(err, PortError::MalformedResponse(_)), "got {err:?}");

        let half_closed = format!("{body}</soap:Body>");
        let err = parse(&half_closed).expect_err("envelope still open");
        assert!(matches!(err, PortError::MalformedResponse(_)), "got {err:?}");
    }

    #[test]
    fn test_should_read_prefixed_soap_body() {
        let body = format!(
            "<soap:Envelope xmlns:soap=\"http://www.w3.org/2003/05/soap-envelope\"><soap:Body>{}</soap:Body></soap:Envelope>",
            TWO_LEVELS.trim_start_matches(r#"<?xml version="1.0" encoding="utf-8"?>"#)
        );

        let response = parse(&body).expect("parses");

        assert_eq!(response.rates.len(), 2);
    }

    #[test]
    fn test_should_tolerate_missing_level_fields() {
        let body = r#"<GetRateQuoteResponse><GetRateQuoteResult>
            <WasSuccess>true</WasSuccess>
            <Result><ServiceLevels><ServiceLevel><Code>STD</Code><NetCharge/></ServiceLevel></ServiceLevels></Result>
        </GetRateQuoteResult></GetRateQuoteResponse>"#;

        let response = parse(body).expect("parses");
        let rate = response.rates.first().expect("one rate");

        assert_eq!(rate.service_name, "");
        assert_eq!(rate.total_price, Decimal::ZERO);
        assert_eq!(rate.delivery_range, DeliveryRange::on(today()));
    }

    #[test]
    fn test_should_unescape_message_text() {
        let body = r#"<GetRateQuoteResponse><GetRateQuoteResult>
            <WasSuccess>false</WasSuccess>
            <Messages><string>Class &amp; weight &lt;required&gt; &#35;1</string></Messages>
        </GetRateQuoteResult></GetRateQuoteResponse>"#;

        let response = parse(body).expect("parses");

        assert_eq!(response.message, "Class & weight <required> #1");
    }

    #[test]
    fn test_should_keep_log_flag() {
        let options = RateOptions {
            log_xml: Some(true),
            ..RateOptions::default()
        };
        let response =
            parse_response_on(&Location::new("US"), &Location::new("US"), &[], TWO_LEVELS, &options, today())
                .expect("parses");

        assert!(response.log_xml, "flag carried to the response");
        assert_eq!(response.xml, TWO_LEVELS);
    }

    #[test]
    fn test_should_parse_currency_amounts() {
        assert_eq!(parse_net_charge("$1,234.56"), Some(Decimal::new(123_456, 2)));
        assert_eq!(parse_net_charge("$0.00"), Some(Decimal::ZERO));
        assert_eq!(parse_net_charge("$1,234,567.89"), Some(Decimal::new(123_456_789, 2)));
        assert_eq!(parse_net_charge(" 87.10 "), Some(Decimal::new(8_710, 2)));
        assert_eq!(parse_net_charge(""), None);
        assert_eq!(parse_net_charge("call for quote"), None);
    }

    #[test]
    fn test_should_parse_leading_day_count() {
        assert_eq!(parse_service_days("3"), 3);
        assert_eq!(parse_service_days(" 5 days"), 5);
        assert_eq!(parse_service_days(""), 0);
        assert_eq!(parse_service_days("n/a"), 0);
        assert_eq!(parse_service_days("-2"), -2);
    }
}
