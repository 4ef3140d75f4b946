//! Templates for the generated agent project.
//!
//! Each template renders one file of the artifact. The agent module is the
//! single source of truth for MCP wiring; the entry point imports it rather
//! than redeclaring it.

use std::collections::HashMap;

use forge_core::{ForgeError, ForgeResult};
use tera::{Tera, Value};

pub const AGENT: &str = "agent.py";
pub const MANIFEST: &str = "pyproject.toml";
pub const ENTRY_POINT: &str = "__main__.py";
pub const README: &str = "README.md";

/// Version stamped into every generated manifest.
pub const PROJECT_VERSION: &str = "0.1.0";

pub const AGENT_TEMPLATE: &str = r#"import os

from coagent.agents import ChatAgent, Model
{%- if mcp_servers %}
from coagent.agents.mcp_server import (
    Connect,
    MCPServer,
    MCPServerSSEParams,
    NamedMCPServer,
)
{%- endif %}
from coagent.core import AgentSpec, new
from dotenv import load_dotenv


load_dotenv()

model = Model(
    id=os.getenv("MODEL_ID"),
    base_url=os.getenv("MODEL_BASE_URL"),
    api_key=os.getenv("MODEL_API_KEY"),
)
{%- if mcp_servers %}


# Manages the connections to the MCP servers declared below.
mcp_server_agent = AgentSpec("mcp_server", new(MCPServer))
{%- endif %}


class Agent(ChatAgent):
    """{{ description | quote }}"""

    system = "{{ prompt | quote }}"
    model = model
{%- if mcp_servers %}
    mcp_servers = [
{%- for server in mcp_servers %}
        NamedMCPServer(
            name="{{ server.name }}",
            connect=Connect(
                transport="sse",
                params=MCPServerSSEParams(
                    url="{{ server.url | quote }}",
                ),
            ),
        ),
{%- endfor %}
    ]
    mcp_server_agent_type = mcp_server_agent.name
{%- endif %}


{{ name }} = AgentSpec("{{ name }}", new(Agent))
"#;

pub const MANIFEST_TEMPLATE: &str = r#"[project]
name = "{{ name }}"
version = "{{ version }}"
description = "{{ description | quote }}"
readme = "README.md"
requires-python = ">=3.10"
dependencies = [
    "python-dotenv>=1.1.0",
    "coagent-python[a2a] @ git+https://github.com/OpenCSGs/coagent.git@2a00e4f2ef9d4d09488f36402a291e12b1753642",
    "grpcio>=1.73.1",
    "protobuf>=6.31.1",
    "google-api-python-client>=2.176.0",
    "hypercorn>=0.17.3",
    "python-telegram-bot>=22.2",
]

[tool.hatch.build.targets.wheel]
packages = ["."]

[tool.hatch.metadata]
allow-direct-references = true

[build-system]
requires = ["hatchling"]
build-backend = "hatchling.build"
"#;

pub const ENTRY_POINT_TEMPLATE: &str = r#"import asyncio

from coagent.core import init_logger
from coagent.runtimes import LocalRuntime
from coagent_web3 import Application
{%- for plugin in plugins %}
from coagent_web3.plugins import {{ plugin }} as plugin_{{ loop.index0 }}
{%- endfor %}

{% if mcp_servers -%}
from {{ name }} import {{ name }}, mcp_server_agent

# MCP servers wired into {{ name }}:
{%- for server in mcp_servers %}
#   - {{ server.name }}
{%- endfor %}
{%- else -%}
from {{ name }} import {{ name }}
{%- endif %}


async def main() -> None:
    async with LocalRuntime() as runtime:
{%- if mcp_servers %}
        await runtime.register(mcp_server_agent)
{%- endif %}
        await runtime.register({{ name }})

        app = Application()
{%- for plugin in plugins %}
        await app.register(plugin_{{ loop.index0 }}.Plugin(runtime, {{ name }}))
{%- endfor %}
        await app.run()


if __name__ == "__main__":
    init_logger("DEBUG")
    asyncio.run(main())
"#;

/// Placeholder environment; never contains real secrets.
pub const ENV_CONTENT: &str = "MODEL_ID=<your-model-id>
MODEL_BASE_URL=<your-model-base-url>
MODEL_API_KEY=<your-model-api-key>
TELEGRAM_TOKEN=<your-telegram-bot-token>
";

pub const README_TEMPLATE: &str = r#"# {{ name }}

{{ description }}


## Getting started

```bash
# fill in the placeholders in .env first
uv run .
```
"#;

/// Build the template registry.
///
/// Autoescaping is disabled: the output is source code, not HTML.
pub fn registry() -> ForgeResult<Tera> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.register_filter("quote", quote);
    tera.add_raw_templates(vec![
        (AGENT, AGENT_TEMPLATE),
        (MANIFEST, MANIFEST_TEMPLATE),
        (ENTRY_POINT, ENTRY_POINT_TEMPLATE),
        (README, README_TEMPLATE),
    ])
    .map_err(|e| ForgeError::render(format!("invalid template: {}", e)))?;
    Ok(tera)
}

/// Escape a string for a double-quoted Python or TOML literal.
fn quote(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("quote filter expects a string"))?;
    Ok(Value::String(escape_str(s)))
}

pub(crate) fn escape_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
