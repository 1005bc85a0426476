//! Sample products shared by unit tests

pub const TOR_JAN: &str = "000
WUUS53 KJAN 291651
TORJAN
MSC035-MSC073-MSC091-291715-
/O.NEW.KJAN.TO.W.0130.050829T1651Z-050829T1815Z/

BULLETIN - EAS ACTIVATION REQUESTED
TORNADO WARNING
NATIONAL WEATHER SERVICE JACKSON MS
1151 AM CDT MON AUG 29 2005

...TORNADO WARNING FOR FORREST...LAMAR AND MARION COUNTIES...

THE NATIONAL WEATHER SERVICE IN JACKSON HAS ISSUED A

* TORNADO WARNING FOR...
  FORREST COUNTY IN SOUTHEAST MISSISSIPPI
  LAMAR COUNTY IN SOUTHEAST MISSISSIPPI
  MARION COUNTY IN SOUTHEAST MISSISSIPPI

* UNTIL 115 PM CDT

* AT 1149 AM CDT...NATIONAL WEATHER SERVICE DOPPLER RADAR INDICATED A
  TORNADO NEAR COLUMBIA...MOVING NORTHEAST AT 35 MPH.

LAT...LON 3244 9017 3234 9076 3282 9081 3292 9013
TIME...MOT...LOC 1650Z 218DEG 37KT 3253 9046

$$
";

pub const TOR_EMERGENCY: &str = "000
WFUS53 KICT 250010
TORICT
KSC173-250045-
/O.NEW.KICT.TO.W.0040.160525T0010Z-160525T0045Z/

BULLETIN - EAS ACTIVATION REQUESTED
TORNADO WARNING
NATIONAL WEATHER SERVICE WICHITA KS
710 PM CDT TUE MAY 24 2016

...TORNADO EMERGENCY FOR THE WICHITA METRO AREA...

* AT 709 PM CDT...A CONFIRMED LARGE AND EXTREMELY DANGEROUS TORNADO
  WAS LOCATED OVER SOUTHWEST WICHITA...MOVING NORTHEAST AT 30 MPH.

THIS IS A PARTICULARLY DANGEROUS SITUATION. TAKE COVER NOW!

LAT...LON 3760 9740 3780 9720 3770 9700 3750 9720
TIME...MOT...LOC 0009Z 225DEG 26KT 3765 9735

TORNADO...OBSERVED
TORNADO DAMAGE THREAT...CATASTROPHIC
HAIL...2.50IN

$$
";

pub const SVR_BOWTIE: &str = "000
WUUS54 KJAN 291651
SVRJAN
MSC035-291745-
/O.NEW.KJAN.SV.W.0200.050829T1651Z-050829T1745Z/

BULLETIN - IMMEDIATE BROADCAST REQUESTED
SEVERE THUNDERSTORM WARNING
NATIONAL WEATHER SERVICE JACKSON MS
1151 AM CDT MON AUG 29 2005

LAT...LON 3200 9200 3240 9200 3240 9160 3200 9170 3210 9160

HAIL...1.00IN
WIND...60MPH

$$
";

pub const WSW_SERIES: [&str; 3] = [
    "000
WWUS43 KDMX 271800
WSWDMX

URGENT - WINTER WEATHER MESSAGE
NATIONAL WEATHER SERVICE DES MOINES IA
1200 PM CST SUN JAN 27 2013

IAZ006-280600-
/O.NEW.KDMX.WS.W.0005.130127T1800Z-130128T0600Z/
EMMET-
1200 PM CST SUN JAN 27 2013

...WINTER STORM WARNING IN EFFECT UNTIL MIDNIGHT CST TONIGHT...

* WHAT...HEAVY SNOW. TOTAL ACCUMULATIONS OF 6 TO 9 INCHES.

$$

IAZ007-280600-
/O.NEW.KDMX.WW.Y.0010.130127T1800Z-130128T0600Z/
KOSSUTH-
1200 PM CST SUN JAN 27 2013

...WINTER WEATHER ADVISORY IN EFFECT UNTIL MIDNIGHT CST TONIGHT...

$$
",
    "000
WWUS43 KDMX 280000
WSWDMX

URGENT - WINTER WEATHER MESSAGE
NATIONAL WEATHER SERVICE DES MOINES IA
600 PM CST SUN JAN 27 2013

IAZ006-280600-
/O.CON.KDMX.WS.W.0005.000000T0000Z-130128T0600Z/
EMMET-
600 PM CST SUN JAN 27 2013

...WINTER STORM WARNING REMAINS IN EFFECT UNTIL MIDNIGHT CST TONIGHT...

$$
",
    "000
WWUS43 KDMX 280538
WSWDMX

URGENT - WINTER WEATHER MESSAGE
NATIONAL WEATHER SERVICE DES MOINES IA
1138 PM CST SUN JAN 27 2013

IAZ006-280615-
/O.CAN.KDMX.WS.W.0005.000000T0000Z-130128T0600Z/
EMMET-
1138 PM CST SUN JAN 27 2013

...WINTER STORM WARNING IS CANCELLED...

THE SNOW HAS ENDED.

$$
",
];

pub const CLI_ALO: &str = "000
CDUS43 KDMX 230636
CLIALO

CLIMATE REPORT
NATIONAL WEATHER SERVICE DES MOINES IA
1236 AM CST WED JAN 23 2013

...................................

...THE WATERLOO CLIMATE SUMMARY FOR JANUARY 22 2013...

CLIMATE NORMAL PERIOD 1981 TO 2010
CLIMATE RECORD PERIOD 1895 TO 2013

WEATHER ITEM   OBSERVED TIME   RECORD YEAR NORMAL DEPARTURE LAST
                VALUE   (LST)  VALUE       VALUE  FROM      YEAR
                                                  NORMAL
...................................................................
TEMPERATURE (F)
 YESTERDAY
  MAXIMUM         -1    259 PM  51    1900  26    -27       38
  MINIMUM        -21    758 AM -21R   2013   8    -29       19
                                      1936
  AVERAGE        -11                        17    -28       29

PRECIPITATION (IN)
  YESTERDAY        T             0.65 1960   0.02  -0.02     0.00
  MONTH TO DATE    0.22                      0.54  -0.32     0.39
  SINCE JAN 1      0.22                      0.54  -0.32     0.39

SNOWFALL (IN)
  YESTERDAY        T             5.4  1960   0.2   -0.2      0.0
  MONTH TO DATE    2.6                       5.6   -3.0      2.1
  SINCE JUL 1     17.3                      18.1   -0.8     21.0
  SNOW DEPTH       1

DEGREE DAYS
 HEATING
  YESTERDAY       76                         48     28       36
  MONTH TO DATE 1166                       1172     -6     1015
 COOLING
  YESTERDAY        0                          0      0        0

WIND (MPH)
  HIGHEST WIND SPEED    22   HIGHEST WIND DIRECTION    NW (310)
  HIGHEST GUST SPEED    31   HIGHEST GUST DIRECTION    NW (310)
  AVERAGE WIND SPEED    14.1

SKY COVER
  AVERAGE SKY COVER 0.3

RELATIVE HUMIDITY (PERCENT)
 HIGHEST    75           700 AM
 LOWEST     57           300 PM
 AVERAGE    66

THE WATERLOO CLIMATE NORMALS FOR TODAY
                         NORMAL    RECORD    YEAR
 MAXIMUM TEMPERATURE (F)   27        58      1942

$$
";
