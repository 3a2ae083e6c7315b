//! Rate quote request documents.
//!
//! The service takes a SOAP 1.2 envelope whose `GetRateQuote` operation
//! carries the API key and a `request` node. Children of `request` are
//! order-sensitive:
//!
//! ```xml
//! <soap12:Envelope xmlns:soap12="http://www.w3.org/2003/05/soap-envelope">
//!   <soap12:Body>
//!     <rlc:GetRateQuote xmlns:rlc="http://www.rlcarriers.com/">
//!       <rlc:APIKey>...</rlc:APIKey>
//!       <rlc:request>
//!         <rlc:CustomerData/> <rlc:QuoteType/> <rlc:CODAmount/>
//!         <rlc:Origin/> <rlc:Destination/> <rlc:Items/>
//!         <rlc:DeclaredValue/> <rlc:Accessorials/> <OverDimensionPcs/>
//!       </rlc:request>
//!     </rlc:GetRateQuote>
//!   </soap12:Body>
//! </soap12:Envelope>
//! ```

use std::io::{self, Write};

use freightrate_core::{Location, Package, PortError, RateOptions, UnitSystem};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};
use tracing::debug;

use crate::wire::{Accessorial, QuoteType};

/// SOAP 1.2 envelope namespace.
pub const SOAP12_NAMESPACE: &str = "http://www.w3.org/2003/05/soap-envelope";
/// Carrier operation namespace.
pub const RLC_NAMESPACE: &str = "http://www.rlcarriers.com/";

const CUSTOMER_DATA: &str = "ShipHawk.com";
// The service rejects any other country code, whatever the WSDL claims.
const COUNTRY_CODE: &str = "USA";
const COD_AMOUNT: &str = "0";
const OVER_DIMENSION_PIECES: &str = "0";

const IMPERIAL_ORIGINS: [&str; 3] = ["US", "LR", "MM"];

/// Unit system the origin country would normally ship in.
#[must_use]
pub fn unit_system_for(origin: &Location) -> UnitSystem {
    let country = origin.country_code();
    if IMPERIAL_ORIGINS.contains(&country.as_str()) {
        UnitSystem::Imperial
    } else {
        UnitSystem::Metric
    }
}

/// Accessorials switched on by the option set, in wire order.
#[must_use]
pub fn requested_accessorials(options: &RateOptions) -> Vec<Accessorial> {
    [
        (options.is_residential(), Accessorial::ResidentialDelivery),
        (options.wants_liftgate(), Accessorial::DestinationLiftgate),
        (
            options.wants_delivery_notification(),
            Accessorial::DeliveryNotification,
        ),
    ]
    .into_iter()
    .filter_map(|(requested, accessorial)| requested.then_some(accessorial))
    .collect()
}

/// Build the `GetRateQuote` document for a shipment.
///
/// Missing `key` or `value` options produce empty elements; validation is
/// left to the caller. Packages are written as-is, so the caller is also
/// responsible for the eight-item limit.
///
/// # Errors
///
/// Returns [`PortError::Internal`] if the document cannot be serialized.
pub fn build_request(
    origin: &Location,
    destination: &Location,
    packages: &[Package],
    options: &RateOptions,
) -> Result<String, PortError> {
    if unit_system_for(origin) == UnitSystem::Metric {
        debug!(
            country = %origin.country_code(),
            "metric origin, quoting in pounds and inches"
        );
    }

    let mut buf = Vec::with_capacity(1024);
    write_document(&mut buf, origin, destination, packages, options)
        .map_err(|err| PortError::Internal(format!("failed to write rate request: {err}")))?;

    String::from_utf8(buf)
        .map_err(|err| PortError::Internal(format!("rate request is not UTF-8: {err}")))
}

fn write_document(
    buf: &mut Vec<u8>,
    origin: &Location,
    destination: &Location,
    packages: &[Package],
    options: &RateOptions,
) -> io::Result<()> {
    let mut writer = Writer::new(buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    writer
        .create_element("soap12:Envelope")
        .with_attribute(("xmlns:soap12", SOAP12_NAMESPACE))
        .write_inner_content(|envelope| {
            envelope
                .create_element("soap12:Body")
                .write_inner_content(|body| {
                    body.create_element("rlc:GetRateQuote")
                        .with_attribute(("xmlns:rlc", RLC_NAMESPACE))
                        .write_inner_content(|operation| {
                            write_text(
                                operation,
                                "rlc:APIKey",
                                options.key.as_deref().unwrap_or_default(),
                            )?;
                            operation
                                .create_element("rlc:request")
                                .write_inner_content(|request| {
                                    write_request_body(
                                        request,
                                        origin,
                                        destination,
                                        packages,
                                        options,
                                    )
                                })?;
                            Ok(())
                        })?;
                    Ok(())
                })?;
            Ok(())
        })?;

    Ok(())
}

fn write_request_body<W: Write>(
    writer: &mut Writer<W>,
    origin: &Location,
    destination: &Location,
    packages: &[Package],
    options: &RateOptions,
) -> io::Result<()> {
    write_text(writer, "rlc:CustomerData", CUSTOMER_DATA)?;
    write_text(writer, "rlc:QuoteType", QuoteType::Domestic.as_str())?;
    write_text(writer, "rlc:CODAmount", COD_AMOUNT)?;
    write_location(writer, "rlc:Origin", origin)?;
    write_location(writer, "rlc:Destination", destination)?;
    write_items(writer, packages)?;
    write_text(
        writer,
        "rlc:DeclaredValue",
        options.value.as_deref().unwrap_or_default(),
    )?;
    write_accessorials(writer, &requested_accessorials(options))?;
    write_text(writer, "OverDimensionPcs", OVER_DIMENSION_PIECES)?;
    Ok(())
}

fn write_location<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    location: &Location,
) -> io::Result<()> {
    writer.create_element(tag).write_inner_content(|node| {
        write_text(node, "rlc:City", location.city.as_deref().unwrap_or_default())?;
        write_text(
            node,
            "rlc:StateOrProvince",
            location.province.as_deref().unwrap_or_default(),
        )?;
        write_text(
            node,
            "rlc:ZipOrPostalCode",
            location.postal_code.as_deref().unwrap_or_default(),
        )?;
        write_text(node, "rlc:CountryCode", COUNTRY_CODE)
    })?;
    Ok(())
}

fn write_items<W: Write>(writer: &mut Writer<W>, packages: &[Package]) -> io::Result<()> {
    let units = UnitSystem::Imperial;

    writer.create_element("rlc:Items").write_inner_content(|items| {
        for package in packages {
            let dims = package.dimensions_in(units);
            items.create_element("rlc:Item").write_inner_content(|item| {
                if let Some(class) = package.freight_class.as_deref() {
                    write_text(item, "rlc:Class", class)?;
                }
                write_text(item, "rlc:Weight", &format_measure(package.weight_in(units)))?;
                write_text(item, "rlc:Width", &format_measure(dims.width))?;
                write_text(item, "rlc:Height", &format_measure(dims.height))?;
                write_text(item, "rlc:Length", &format_measure(dims.length))
            })?;
        }
        Ok(())
    })?;
    Ok(())
}

fn write_accessorials<W: Write>(
    writer: &mut Writer<W>,
    accessorials: &[Accessorial],
) -> io::Result<()> {
    writer
        .create_element("rlc:Accessorials")
        .write_inner_content(|node| {
            for accessorial in accessorials {
                write_text(node, "rlc:Accessorial", accessorial.as_str())?;
            }
            Ok(())
        })?;
    Ok(())
}

/// Write a simple `<tag>text</tag>` element.
fn write_text<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

fn format_measure(value: f64) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Location {
        Location::new("US")
            .with_city("Wilmington")
            .with_province("OH")
            .with_postal_code("45177")
    }

    fn destination() -> Location {
        Location::new("CA")
            .with_city("Toronto")
            .with_province("ON")
            .with_postal_code("M5V 2T6")
    }

    fn options() -> RateOptions {
        RateOptions::default()
            .with_key("api-key-123")
            .with_value("1500.00")
    }

    fn build(packages: &[Package], options: &RateOptions) -> String {
        build_request(&origin(), &destination(), packages, options).expect("request builds")
    }

    #[test]
    fn test_should_emit_one_item_per_package_in_order() {
        let packages = [
            Package::new(150.0, [48.0, 40.0, 36.0]).with_freight_class("70"),
            Package::new(12.5, [10.0, 8.0, 6.0]),
            Package::new(300.0, [96.0, 48.0, 48.0]).with_freight_class("92.5"),
        ];

        let xml = build(&packages, &options());

        assert_eq!(xml.matches("<rlc:Item>").count(), 3);
        assert_eq!(xml.matches("<rlc:Class>").count(), 2);
        let first = xml.find("<rlc:Weight>150</rlc:Weight>").expect("first item");
        let second = xml.find("<rlc:Weight>12.5</rlc:Weight>").expect("second item");
        let third = xml.find("<rlc:Weight>300</rlc:Weight>").expect("third item");
        assert!(first < second && second < third, "items keep input order");
        assert!(xml.contains(
            "<rlc:Item><rlc:Class>70</rlc:Class><rlc:Weight>150</rlc:Weight>\
             <rlc:Width>40</rlc:Width><rlc:Height>36</rlc:Height><rlc:Length>48</rlc:Length></rlc:Item>"
        ));
        assert!(xml.contains(
            "<rlc:Item><rlc:Weight>12.5</rlc:Weight><rlc:Width>8</rlc:Width>\
             <rlc:Height>6</rlc:Height><rlc:Length>10</rlc:Length></rlc:Item>"
        ));
    }

    #[test]
    fn test_should_always_send_fixed_country_code() {
        let xml = build(&[Package::new(10.0, [1.0, 1.0, 1.0])], &options());

        assert_eq!(xml.matches("<rlc:CountryCode>USA</rlc:CountryCode>").count(), 2);
        assert!(!xml.contains("<rlc:CountryCode>CA</rlc:CountryCode>"));
        assert!(xml.contains("<rlc:City>Toronto</rlc:City>"));
        assert!(xml.contains("<rlc:ZipOrPostalCode>M5V 2T6</rlc:ZipOrPostalCode>"));
    }

    #[test]
    fn test_should_write_request_fields_in_required_order() {
        let xml = build(&[Package::new(10.0, [1.0, 1.0, 1.0])], &options());

        let order = [
            "<rlc:APIKey>api-key-123</rlc:APIKey>",
            "<rlc:CustomerData>ShipHawk.com</rlc:CustomerData>",
            "<rlc:QuoteType>Domestic</rlc:QuoteType>",
            "<rlc:CODAmount>0</rlc:CODAmount>",
            "<rlc:Origin>",
            "<rlc:Destination>",
            "<rlc:Items>",
            "<rlc:DeclaredValue>1500.00</rlc:DeclaredValue>",
            "<rlc:Accessorials>",
            "<OverDimensionPcs>0</OverDimensionPcs>",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|needle| xml.find(needle).unwrap_or(usize::MAX))
            .collect();

        assert!(
            positions.windows(2).all(|pair| pair.first() < pair.get(1)),
            "fields out of order: {xml}"
        );
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains(
            "<soap12:Envelope xmlns:soap12=\"http://www.w3.org/2003/05/soap-envelope\">"
        ));
        assert!(xml.contains("<rlc:GetRateQuote xmlns:rlc=\"http://www.rlcarriers.com/\">"));
    }

    #[test]
    fn test_should_only_emit_requested_accessorials() {
        let packages = [Package::new(10.0, [1.0, 1.0, 1.0])];

        let none = build(&packages, &options());
        assert_eq!(none.matches("<rlc:Accessorial>").count(), 0);

        let liftgate = RateOptions {
            liftgate: Some(true),
            residential: Some(false),
            ..options()
        };
        let xml = build(&packages, &liftgate);
        assert_eq!(xml.matches("<rlc:Accessorial>").count(), 1);
        assert!(xml.contains("<rlc:Accessorial>DestinationLiftgate</rlc:Accessorial>"));

        let all = RateOptions {
            residential: Some(true),
            liftgate: Some(true),
            delivery_notification: Some(true),
            ..options()
        };
        let xml = build(&packages, &all);
        assert_eq!(xml.matches("<rlc:Accessorial>").count(), 3);
        assert!(xml.contains(
            "<rlc:Accessorials><rlc:Accessorial>ResidentialDelivery</rlc:Accessorial>\
             <rlc:Accessorial>DestinationLiftgate</rlc:Accessorial>\
             <rlc:Accessorial>DeliveryNotification</rlc:Accessorial></rlc:Accessorials>"
        ));
    }

    #[test]
    fn test_should_leave_missing_options_empty() {
        let xml = build(&[Package::new(10.0, [1.0, 1.0, 1.0])], &RateOptions::default());

        assert!(xml.contains("<rlc:APIKey></rlc:APIKey>"));
        assert!(xml.contains("<rlc:DeclaredValue></rlc:DeclaredValue>"));
    }

    #[test]
    fn test_should_write_empty_location_fields() {
        let xml = build_request(
            &Location::new("US"),
            &Location::new("US"),
            &[Package::new(10.0, [1.0, 1.0, 1.0])],
            &options(),
        )
        .expect("request builds");

        assert!(xml.contains(
            "<rlc:Origin><rlc:City></rlc:City><rlc:StateOrProvince></rlc:StateOrProvince>\
             <rlc:ZipOrPostalCode></rlc:ZipOrPostalCode><rlc:CountryCode>USA</rlc:CountryCode></rlc:Origin>"
        ));
    }

    #[test]
    fn test_should_escape_text_content() {
        let origin = Location::new("US").with_city("Town & <Country>");
        let xml = build_request(
            &origin,
            &destination(),
            &[Package::new(10.0, [1.0, 1.0, 1.0])],
            &options(),
        )
        .expect("request builds");

        assert!(xml.contains("<rlc:City>Town &amp; &lt;Country&gt;</rlc:City>"));
    }

    #[test]
    fn test_should_build_identical_documents_for_identical_input() {
        let packages = [Package::new(42.0, [12.0, 12.0, 12.0]).with_freight_class("85")];

        assert_eq!(build(&packages, &options()), build(&packages, &options()));
    }

    #[test]
    fn test_should_pick_unit_system_from_origin() {
        assert_eq!(unit_system_for(&Location::new("us")), UnitSystem::Imperial);
        assert_eq!(unit_system_for(&Location::new("MM")), UnitSystem::Imperial);
        assert_eq!(unit_system_for(&Location::new("DE")), UnitSystem::Metric);
    }

    #[test]
    fn test_should_encode_metric_origin_in_pounds_and_inches() {
        let xml = build_request(
            &Location::new("DE"),
            &destination(),
            &[Package::new(100.0, [10.0, 20.0, 30.0])],
            &options(),
        )
        .expect("request builds");

        assert!(xml.contains("<rlc:Weight>100</rlc:Weight>"));
        assert!(xml.contains("<rlc:Length>10</rlc:Length>"));
    }
}
