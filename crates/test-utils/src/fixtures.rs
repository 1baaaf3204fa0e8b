//! A small Star Wars flavored schema with the documents built against it.

/// Package every fixture document lives in.
pub const PACKAGE_PATH: &str = "com/example";

pub const SCHEMA_SDL: &str = r"interface Node {
  id: ID!
}

type Query {
  species(id: ID, speciesID: ID): Species
  allFilms(first: Int): FilmsConnection
  node(id: ID!): Node
}

type Species implements Node {
  id: ID!
  name: String
  classification: String
  language: String
}

type FilmsConnection {
  totalCount: Int
  films: [Film]
}

type Film implements Node {
  id: ID!
  title: String
  director: String
}
";

/// [`SCHEMA_SDL`] as an introspection query response.
pub const SCHEMA_JSON: &str = r#"{
  "data": {
    "__schema": {
      "queryType": { "name": "Query" },
      "mutationType": null,
      "subscriptionType": null,
      "types": [
        {
          "kind": "INTERFACE",
          "name": "Node",
          "fields": [
            { "name": "id", "args": [], "type": { "kind": "NON_NULL", "name": null, "ofType": { "kind": "SCALAR", "name": "ID", "ofType": null } } }
          ],
          "interfaces": [],
          "possibleTypes": [{ "name": "Species" }, { "name": "Film" }]
        },
        {
          "kind": "OBJECT",
          "name": "Query",
          "fields": [
            {
              "name": "species",
              "args": [
                { "name": "id", "type": { "kind": "SCALAR", "name": "ID", "ofType": null }, "defaultValue": null },
                { "name": "speciesID", "type": { "kind": "SCALAR", "name": "ID", "ofType": null }, "defaultValue": null }
              ],
              "type": { "kind": "OBJECT", "name": "Species", "ofType": null }
            },
            {
              "name": "allFilms",
              "args": [
                { "name": "first", "type": { "kind": "SCALAR", "name": "Int", "ofType": null }, "defaultValue": null }
              ],
              "type": { "kind": "OBJECT", "name": "FilmsConnection", "ofType": null }
            },
            {
              "name": "node",
              "args": [
                { "name": "id", "type": { "kind": "NON_NULL", "name": null, "ofType": { "kind": "SCALAR", "name": "ID", "ofType": null } }, "defaultValue": null }
              ],
              "type": { "kind": "INTERFACE", "name": "Node", "ofType": null }
            }
          ],
          "interfaces": []
        },
        {
          "kind": "OBJECT",
          "name": "Species",
          "fields": [
            { "name": "id", "args": [], "type": { "kind": "NON_NULL", "name": null, "ofType": { "kind": "SCALAR", "name": "ID", "ofType": null } } },
            { "name": "name", "args": [], "type": { "kind": "SCALAR", "name": "String", "ofType": null } },
            { "name": "classification", "args": [], "type": { "kind": "SCALAR", "name": "String", "ofType": null } },
            { "name": "language", "args": [], "type": { "kind": "SCALAR", "name": "String", "ofType": null } }
          ],
          "interfaces": [{ "name": "Node" }]
        },
        {
          "kind": "OBJECT",
          "name": "FilmsConnection",
          "fields": [
            { "name": "totalCount", "args": [], "type": { "kind": "SCALAR", "name": "Int", "ofType": null } },
            { "name": "films", "args": [], "type": { "kind": "LIST", "name": null, "ofType": { "kind": "OBJECT", "name": "Film", "ofType": null } } }
          ],
          "interfaces": []
        },
        {
          "kind": "OBJECT",
          "name": "Film",
          "fields": [
            { "name": "id", "args": [], "type": { "kind": "NON_NULL", "name": null, "ofType": { "kind": "SCALAR", "name": "ID", "ofType": null } } },
            { "name": "title", "args": [], "type": { "kind": "SCALAR", "name": "String", "ofType": null } },
            { "name": "director", "args": [], "type": { "kind": "SCALAR", "name": "String", "ofType": null } }
          ],
          "interfaces": [{ "name": "Node" }]
        },
        { "kind": "SCALAR", "name": "ID" },
        { "kind": "SCALAR", "name": "String" },
        { "kind": "SCALAR", "name": "Int" },
        { "kind": "SCALAR", "name": "Boolean" }
      ],
      "directives": []
    }
  }
}
"#;

/// Text that is neither JSON nor SDL.
pub const INVALID_SCHEMA: &str = "This is an invalid schema";

/// Species id used by the shared `DroidDetails` query.
pub const DROID_SPECIES_ID: &str = "c3BlY2llczoy";

/// Species id used by the debug override of `DroidDetails`.
pub const DEBUG_SPECIES_ID: &str = "speciesIdForDebug";

pub const DROID_DETAILS: &str = r#"query DroidDetails {
  species(id: "c3BlY2llczoy") {
    id
    name
    ...SpeciesInformation
  }
}
"#;

/// [`DROID_DETAILS`] with the species id replaced by [`DEBUG_SPECIES_ID`].
pub const DROID_DETAILS_DEBUG: &str = r#"query DroidDetails {
  species(id: "speciesIdForDebug") {
    id
    name
    ...SpeciesInformation
  }
}
"#;

pub const SPECIES_INFORMATION: &str = r"fragment SpeciesInformation on Species {
  classification
  language
}
";

pub const FILMS: &str = r"query Films($first: Int) {
  allFilms(first: $first) {
    totalCount
    films {
      title
      director
    }
  }
}
";

/// Logical name of a fixture file inside [`PACKAGE_PATH`].
#[must_use]
pub fn logical_name(file_name: &str) -> String {
    format!("{PACKAGE_PATH}/{file_name}")
}
