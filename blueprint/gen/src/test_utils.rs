//! Fixtures shared by the generator unit tests.

use blueprint_define::ApiDefinition;
use blueprint_define::prelude::*;
use syn::Path;

/// A small finalized design exercising views, links, defaults, arrays and
/// inline payloads.
pub fn make_design() -> Design {
    let mut design = Design::new();

    design.api("cellar", |api| {
        api.trait_def("Authenticated", |a| {
            a.headers(|h| {
                h.attribute("Authorization", Primitive::String);
                h.required(["Authorization"]);
            });
        });
    });

    design.user_type("BottlePayload", |a| {
        a.attribute_with("name", Primitive::String, |n| {
            n.min_length(2);
        });
        a.attribute_with("vintage", Primitive::Integer, |v| {
            v.minimum(1900);
        });
        a.required(["name", "vintage"]);
    });

    design.media_type("Account", "application/vnd.account+json", |mt| {
        mt.attributes(|a| {
            a.attribute("id", Primitive::Integer);
            a.attribute("href", Primitive::String);
            a.attribute("name", Primitive::String);
            a.required(["id", "href"]);
        });
        mt.view("default", |v| {
            v.attribute("id").attribute("href").attribute("name");
        });
        mt.view("tiny", |v| {
            v.attribute("id").attribute("name");
        });
        mt.view("link", |v| {
            v.attribute("href");
        });
    });

    design.media_type("Bottle", "application/vnd.bottle+json", |mt| {
        mt.reference("BottlePayload");
        mt.attributes(|a| {
            a.attribute("id", Primitive::Integer);
            a.attribute("account", DataType::media_type("Account"));
            a.attribute("tags", DataType::array(Primitive::String));
            a.required(["id"]);
        });
        mt.link("account");
        mt.view("default", |v| {
            v.attribute("id")
                .attribute("name")
                .attribute("vintage")
                .attribute("account:tiny")
                .link("account");
        });
        mt.view("tiny", |v| {
            v.attribute("id").attribute("name");
        });
    });

    design.media_type("BottlePage", "application/vnd.bottle-page+json", |mt| {
        mt.attributes(|a| {
            a.attribute("bottles", DataType::array(DataType::media_type("Bottle")));
            a.attribute("count", Primitive::Integer);
            a.required(["bottles", "count"]);
        });
    });

    design.resource("bottle", |r| {
        r.base_path("/bottles");
        r.media_type("Bottle");
        r.canonical_action("show");
        r.action("list", |a| {
            a.get("");
            a.params(|p| {
                p.attribute("years", DataType::array(Primitive::Integer));
                p.attribute_with("page", Primitive::Integer, |pg| {
                    pg.default(1);
                });
            });
            a.response_template(OK, &["BottlePage"]);
        });
        r.action("show", |a| {
            a.get("/:id");
            a.params(|p| {
                p.attribute("id", Primitive::Integer);
            });
            a.response_template(OK, &["Bottle"]);
            a.response("NotFound");
        });
        r.action("create", |a| {
            a.post("");
            a.use_trait("Authenticated");
            a.payload_with(DataType::object(), |p| {
                p.attribute("name", Primitive::String);
                p.required(["name"]);
            });
            a.response("Created");
        });
    });

    design
}

pub fn make_api() -> ApiDefinition {
    make_design().run().expect("fixture design is valid")
}

pub fn runtime_path() -> Path {
    syn::parse_str("blueprint_types").expect("valid path")
}
